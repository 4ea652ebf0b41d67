// Copyright 2026 the Compact Term Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The operand term codec.
//!
//! The decoder consumes a prefix of a byte stream and yields one [`Term`];
//! the encoder emits the canonical (shortest legal) byte sequence for a
//! term. Canonical encodings round-trip bit-exactly, which is what the
//! stream helpers [`roundtrip`] and [`canonicalize`] check and enforce.
//!
//! Decoding accepts non-canonical but well-formed input (an oversized
//! length form for a small value); such input decodes to the same term and
//! re-encodes canonically, so it does not round-trip byte-for-byte.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;

use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

use crate::codec_primitives::{be_to_u64, big_unsigned_be, negative_be, unsigned_be};
use crate::format::{DecodeError, Reader, Writer};
use crate::tag::{
    EXT_ALLOC, EXT_FLOAT, EXT_FP_REG, EXT_LIST, EXT_LITERAL, EXT_TYPED_REG, LARGE_BIT, MEDIUM_BIT,
    SUB_TAG_MASK, Tag,
};
use crate::term::Term;

/// Decodes a single term from the start of `bytes`, returning the term and
/// the unconsumed remainder.
pub fn decode(bytes: &[u8]) -> Result<(Term, &[u8]), DecodeError> {
    let mut r = Reader::new(bytes);
    let term = decode_from(&mut r)?;
    Ok((term, r.rest()))
}

/// Decodes a single term at the reader's current position.
///
/// This is the incremental entry point for callers that interleave term
/// decoding with other reads over the same buffer.
pub fn decode_from(r: &mut Reader<'_>) -> Result<Term, DecodeError> {
    let starter = r.read_u8()?;
    match Tag::of(starter) {
        Tag::Extended => decode_extended(r, starter),
        // Sign extension is conditional on the tag: only Integer payload
        // byte runs are read as two's complement. The small and medium
        // forms are unsigned for every tag.
        Tag::Integer => Ok(Term::Integer(match shape(r, starter)? {
            Shape::Immediate(v) => BigInt::from(v),
            Shape::Wide(bytes) => BigInt::from_signed_bytes_be(bytes),
        })),
        Tag::Literal => Ok(Term::Literal(unsigned_value(r, starter)?)),
        Tag::Atom => Ok(Term::Atom(unsigned_value(r, starter)?)),
        Tag::XReg => Ok(Term::XReg(unsigned_value(r, starter)?)),
        Tag::YReg => Ok(Term::YReg(unsigned_value(r, starter)?)),
        Tag::Label => Ok(Term::Label(unsigned_value(r, starter)?)),
        Tag::Char => Ok(Term::Char(unsigned_value(r, starter)?)),
    }
}

/// Decodes an entire stream into its ordered terms.
///
/// Empty input yields an empty list.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<Term>, DecodeError> {
    let mut r = Reader::new(bytes);
    let mut out = Vec::new();
    while !r.is_empty() {
        out.push(decode_from(&mut r)?);
    }
    Ok(out)
}

/// Encodes `term` in canonical form.
#[must_use]
pub fn encode(term: &Term) -> Vec<u8> {
    let mut w = Writer::new();
    encode_term(term, &mut w);
    w.into_vec()
}

/// Appends the canonical encoding of `term` to `w`.
pub fn encode_term(term: &Term, w: &mut Writer) {
    match term {
        Term::XReg(v) => encode_unsigned(Tag::XReg, *v, w),
        Term::YReg(v) => encode_unsigned(Tag::YReg, *v, w),
        Term::Label(v) => encode_unsigned(Tag::Label, *v, w),
        Term::Atom(v) => encode_unsigned(Tag::Atom, *v, w),
        Term::Literal(v) => encode_unsigned(Tag::Literal, *v, w),
        Term::Char(v) => encode_unsigned(Tag::Char, *v, w),
        Term::Integer(n) => encode_integer(n, w),
        Term::Float(f) => {
            w.write_u8(EXT_FLOAT);
            w.write_u64_be(f.to_bits());
        }
        Term::FloatReg(v) => {
            w.write_u8(EXT_FP_REG);
            encode_unsigned(Tag::Integer, *v, w);
        }
        Term::TypedReg { reg, type_index } => {
            w.write_u8(EXT_TYPED_REG);
            encode_term(reg, w);
            encode_unsigned(Tag::Integer, *type_index, w);
        }
        Term::List(items) => {
            w.write_u8(EXT_LIST);
            encode_unsigned(Tag::Integer, items.len() as u64, w);
            for item in items {
                encode_term(item, w);
            }
        }
        Term::Alloc(pairs) => {
            w.write_u8(EXT_ALLOC);
            encode_unsigned(Tag::Integer, pairs.len() as u64, w);
            for (kind, amount) in pairs {
                encode_term(kind, w);
                encode_term(amount, w);
            }
        }
        Term::Extended { sub_tag, value } => encode_extended(*sub_tag, *value, w),
    }
}

/// Returns `true` if `bytes` is exactly one canonically encoded term.
#[must_use]
pub fn roundtrip(bytes: &[u8]) -> bool {
    match decode(bytes) {
        Ok((term, rest)) => rest.is_empty() && encode(&term) == bytes,
        Err(_) => false,
    }
}

/// Decodes an entire stream and re-emits every term canonically.
///
/// This normalizes accepted-but-oversized length forms; canonical input
/// comes back unchanged.
pub fn canonicalize(bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut r = Reader::new(bytes);
    let mut w = Writer::new();
    while !r.is_empty() {
        encode_term(&decode_from(&mut r)?, &mut w);
    }
    Ok(w.into_vec())
}

/// The value position of a non-extended starter byte.
enum Shape<'a> {
    /// Carried by the starter itself (small form) or one trailing byte
    /// (medium form).
    Immediate(u64),
    /// Carried by a trailing big-endian byte run (large form).
    Wide(&'a [u8]),
}

fn shape<'a>(r: &mut Reader<'a>, starter: u8) -> Result<Shape<'a>, DecodeError> {
    if starter & MEDIUM_BIT == 0 {
        return Ok(Shape::Immediate(u64::from(starter >> 4)));
    }
    if starter & LARGE_BIT == 0 {
        let low = r.read_u8()?;
        return Ok(Shape::Immediate(
            (u64::from(starter & 0xE0) << 3) | u64::from(low),
        ));
    }
    let n = match usize::from(starter >> 5) {
        // All size bits set: the byte count itself is a nested term,
        // biased past the largest embedded count.
        7 => nested_len(r)?
            .checked_add(9)
            .ok_or(DecodeError::OutOfBounds)?,
        s => s + 2,
    };
    Ok(Shape::Wide(r.read_bytes(n)?))
}

fn unsigned_value(r: &mut Reader<'_>, starter: u8) -> Result<u64, DecodeError> {
    match shape(r, starter)? {
        Shape::Immediate(v) => Ok(v),
        Shape::Wide(bytes) => be_to_u64(bytes),
    }
}

/// Decodes a nested term that must be a non-negative integer (length
/// prefixes, register numbers, type indices).
fn nested_unsigned(r: &mut Reader<'_>) -> Result<u64, DecodeError> {
    let Term::Integer(n) = decode_from(r)? else {
        return Err(DecodeError::MalformedFraming);
    };
    if n.sign() == Sign::Minus {
        return Err(DecodeError::MalformedFraming);
    }
    n.to_u64().ok_or(DecodeError::OutOfBounds)
}

fn nested_len(r: &mut Reader<'_>) -> Result<usize, DecodeError> {
    usize::try_from(nested_unsigned(r)?).map_err(|_| DecodeError::OutOfBounds)
}

/// Decodes a container length and rejects counts the remaining input can
/// never satisfy, so a hostile length fails before element storage is
/// reserved. `min_item_bytes` is the smallest wire cost of one counted
/// item: one byte for a list element, two for an alloc pair.
fn container_len(r: &mut Reader<'_>, min_item_bytes: usize) -> Result<usize, DecodeError> {
    let len = nested_len(r)?;
    if len.saturating_mul(min_item_bytes) > r.remaining() {
        return Err(DecodeError::UnexpectedEof);
    }
    Ok(len)
}

fn decode_extended(r: &mut Reader<'_>, starter: u8) -> Result<Term, DecodeError> {
    match starter {
        EXT_FLOAT => Ok(Term::Float(f64::from_bits(r.read_u64_be()?))),
        EXT_LIST => {
            let len = container_len(r, 1)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(decode_from(r)?);
            }
            Ok(Term::List(items))
        }
        EXT_FP_REG => Ok(Term::FloatReg(nested_unsigned(r)?)),
        EXT_ALLOC => {
            let len = container_len(r, 2)?;
            let mut pairs = Vec::with_capacity(len);
            for _ in 0..len {
                let kind = decode_from(r)?;
                let amount = decode_from(r)?;
                pairs.push((kind, amount));
            }
            Ok(Term::Alloc(pairs))
        }
        EXT_LITERAL => {
            // Lenient on the inner variant: any index-bearing term
            // supplies the literal-table index.
            let index = match decode_from(r)? {
                Term::Integer(n) => {
                    if n.sign() == Sign::Minus {
                        return Err(DecodeError::MalformedFraming);
                    }
                    n.to_u64().ok_or(DecodeError::OutOfBounds)?
                }
                Term::Literal(v)
                | Term::Atom(v)
                | Term::XReg(v)
                | Term::YReg(v)
                | Term::Label(v)
                | Term::Char(v) => v,
                _ => return Err(DecodeError::MalformedFraming),
            };
            Ok(Term::Literal(index))
        }
        EXT_TYPED_REG => {
            let reg = decode_from(r)?;
            let type_index = nested_unsigned(r)?;
            Ok(Term::TypedReg {
                reg: Box::new(reg),
                type_index,
            })
        }
        _ => {
            // Unknown sub-tag: the starter still describes a length form
            // (never sign-extended under tag 7). Preserving the sub-tag
            // bits lets the encoder re-emit the term bit-identically.
            let value = unsigned_value(r, starter)?;
            Ok(Term::Extended {
                sub_tag: starter & SUB_TAG_MASK,
                value,
            })
        }
    }
}

/// Canonical tagged encoding of a non-negative value: the shortest of the
/// small, medium, and large forms that fits.
fn encode_unsigned(tag: Tag, v: u64, w: &mut Writer) {
    if v < 0x10 {
        w.write_u8(((v as u8) << 4) | tag.bits());
    } else if v < 0x800 {
        w.write_u8((((v >> 3) as u8) & 0xE0) | MEDIUM_BIT | tag.bits());
        w.write_u8((v & 0xFF) as u8);
    } else {
        write_wide(tag, unsigned_be(v).as_slice(), w);
    }
}

fn encode_integer(n: &BigInt, w: &mut Writer) {
    if let Some(v) = n.to_u64() {
        encode_unsigned(Tag::Integer, v, w);
    } else if n.sign() == Sign::Minus {
        // Negatives never use the small or medium forms: those are
        // unsigned by construction.
        write_wide(Tag::Integer, &negative_be(n), w);
    } else {
        write_wide(Tag::Integer, &big_unsigned_be(n), w);
    }
}

/// Emits a large-form starter and payload. `m` is at least two bytes.
fn write_wide(tag: Tag, m: &[u8], w: &mut Writer) {
    if m.len() <= 8 {
        w.write_u8((((m.len() - 2) as u8) << 5) | LARGE_BIT | MEDIUM_BIT | tag.bits());
    } else {
        w.write_u8((7 << 5) | LARGE_BIT | MEDIUM_BIT | tag.bits());
        encode_unsigned(Tag::Integer, (m.len() - 9) as u64, w);
    }
    w.write_bytes(m);
}

fn encode_extended(sub_tag: u8, value: u64, w: &mut Writer) {
    // The preserved sub-tag bits go back into the starter position and
    // are the source of truth for the length form: the decoder consumed
    // whatever payload those bits describe, so re-emission fits the value
    // into the same shape.
    w.write_u8(sub_tag | Tag::Extended.bits());
    if sub_tag & MEDIUM_BIT == 0 {
        // Small form: the value nibble is already part of the sub-tag
        // bits.
    } else if sub_tag & LARGE_BIT == 0 {
        w.write_u8((value & 0xFF) as u8);
    } else {
        match usize::from(sub_tag >> 5) {
            // Escape form: a zero-biased size term and nine payload
            // bytes hold any value the decoder can hand back.
            7 => {
                encode_unsigned(Tag::Integer, 0, w);
                w.write_u8(0x00);
                w.write_u64_be(value);
            }
            // Embedded size: the sub-tag pins the payload width; the
            // value is zero-extended into it.
            s => {
                let n = s + 2;
                w.write_bytes(&value.to_be_bytes()[8 - n..]);
            }
        }
    }
}
