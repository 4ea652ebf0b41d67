// Copyright 2026 the Compact Term Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `compact_term`: codec for the compact operand term format of BEAM
//! Code chunks.
//!
//! Instruction operands inside a Code chunk are serialized as a stream of
//! self-delimiting tagged values: register references, jump labels, table
//! indices, inline integers and floats, typed registers, and nested
//! argument/allocation lists. This crate decodes that stream into [`term::Term`]
//! values and re-encodes terms in canonical (shortest legal) form, such
//! that compiler-produced streams survive a decode/encode cycle
//! bit-exactly.
//!
//! Locating the Code chunk and stripping its fixed header is the container
//! reader's job; this crate starts at the first operand byte.
//!
//! ## Example
//!
//! ```
//! use compact_term::codec::{decode, decode_all, encode, roundtrip};
//! use compact_term::term::Term;
//!
//! // One term is consumed; the rest of the stream comes back untouched.
//! let (term, rest) = decode(&[0x53, 0x12]).unwrap();
//! assert_eq!(term, Term::XReg(5));
//! assert_eq!(rest, &[0x12][..]);
//!
//! let terms = decode_all(&[0x53, 0x12]).unwrap();
//! assert_eq!(terms, [Term::XReg(5), Term::Atom(1)]);
//!
//! assert_eq!(encode(&Term::XReg(5)), [0x53]);
//! assert!(roundtrip(&[0x53]));
//! ```

#![no_std]

extern crate alloc;

pub mod codec;
pub(crate) mod codec_primitives;
pub mod format;
pub mod tag;
pub mod term;
