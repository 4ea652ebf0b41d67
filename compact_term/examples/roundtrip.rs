// Copyright 2026 the Compact Term Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encode/decode demo.
//!
//! Run with:
//! `cargo run -p compact_term --example roundtrip`

use compact_term::codec::{canonicalize, decode_all, encode_term};
use compact_term::format::Writer;
use compact_term::term::Term;

fn main() {
    let operands = [
        Term::Label(12),
        Term::XReg(0),
        Term::Atom(3),
        Term::int(-32768),
        Term::Float(3.14159),
        Term::List(vec![Term::Atom(1), Term::int(2), Term::YReg(7)]),
        Term::TypedReg {
            reg: Box::new(Term::XReg(5)),
            type_index: 42,
        },
    ];

    let mut w = Writer::new();
    for term in &operands {
        encode_term(term, &mut w);
    }
    let bytes = w.into_vec();

    print!("stream:");
    for b in &bytes {
        print!(" {b:02X}");
    }
    println!();

    let back = decode_all(&bytes).unwrap();
    assert_eq!(back, operands);
    assert_eq!(canonicalize(&bytes).unwrap(), bytes);

    for term in &back {
        println!("{term:?}");
    }
}
