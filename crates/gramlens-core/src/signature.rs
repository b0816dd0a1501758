//! Pattern signature algebra: relax, split, glue and slot masking.
//!
//! A full signature of length `n` is `3*n` parts joined by `_`:
//! `dep_0.._dep_{n-1}_pos_0.._pos_{n-1}_tag_0.._tag_{n-1}`.
//! All functions are pure.

use crate::constants::{SIGNATURE_BLOCKS, SIGNATURE_SEPARATOR};
use crate::errors::SignatureError;
use crate::types::{SlotRef, SIGNATURE_FEATURES};

/// The dep/pos/tag blocks of one signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocks<'a> {
    pub dep: Vec<&'a str>,
    pub pos: Vec<&'a str>,
    pub tag: Vec<&'a str>,
}

impl<'a> Blocks<'a> {
    /// Parse leniently: missing trailing parts become empty strings,
    /// surplus parts are ignored.
    pub fn parse(signature: &'a str, length: usize) -> Self {
        let mut parts: Vec<&'a str> = if signature.is_empty() {
            Vec::new()
        } else {
            signature.split(SIGNATURE_SEPARATOR).collect()
        };
        if parts.len() < SIGNATURE_BLOCKS * length {
            parts.resize(SIGNATURE_BLOCKS * length, "");
        }
        Self {
            dep: parts[..length].to_vec(),
            pos: parts[length..2 * length].to_vec(),
            tag: parts[2 * length..3 * length].to_vec(),
        }
    }

    /// Parse strictly: the part count must be exactly `3*length`.
    pub fn parse_exact(signature: &'a str, length: usize) -> Result<Self, SignatureError> {
        let found = if signature.is_empty() {
            0
        } else {
            signature.split(SIGNATURE_SEPARATOR).count()
        };
        let expected = SIGNATURE_BLOCKS * length;
        if found != expected {
            return Err(SignatureError::PartCount {
                signature: signature.to_string(),
                expected,
                found,
            });
        }
        Ok(Self::parse(signature, length))
    }

    pub fn len(&self) -> usize {
        self.dep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dep.is_empty()
    }

    /// Slot `i` in signature order (all deps, then pos, then tags).
    pub fn slot(&self, index: usize) -> &'a str {
        let n = self.len();
        match index / n.max(1) {
            0 => self.dep[index % n],
            1 => self.pos[index % n],
            _ => self.tag[index % n],
        }
    }

    fn serialize(&self) -> String {
        join(self.dep.iter().chain(self.pos.iter()).chain(self.tag.iter()))
    }
}

/// Join signature parts with the separator.
pub(crate) fn join<I>(parts: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push(SIGNATURE_SEPARATOR);
        }
        out.push_str(part.as_ref());
    }
    out
}

/// Drop the dependency block: `pos-block_tag-block`.
pub fn relax(signature: &str, length: usize) -> String {
    let blocks = Blocks::parse(signature, length);
    join(blocks.pos.iter().chain(blocks.tag.iter()))
}

/// Divide every block at token `position`, yielding two full signatures of
/// lengths `position` and `length - position`.
pub fn split(
    signature: &str,
    length: usize,
    position: usize,
) -> Result<(String, String), SignatureError> {
    if position > length {
        return Err(SignatureError::SplitOutOfRange { position, length });
    }
    let blocks = Blocks::parse(signature, length);
    let left = Blocks {
        dep: blocks.dep[..position].to_vec(),
        pos: blocks.pos[..position].to_vec(),
        tag: blocks.tag[..position].to_vec(),
    };
    let right = Blocks {
        dep: blocks.dep[position..].to_vec(),
        pos: blocks.pos[position..].to_vec(),
        tag: blocks.tag[position..].to_vec(),
    };
    Ok((left.serialize(), right.serialize()))
}

/// Concatenate two signatures block-wise into one of length `len_a + len_b`.
pub fn glue(sig_a: &str, len_a: usize, sig_b: &str, len_b: usize) -> String {
    let a = Blocks::parse(sig_a, len_a);
    let b = Blocks::parse(sig_b, len_b);
    let glued = Blocks {
        dep: a.dep.iter().chain(b.dep.iter()).copied().collect(),
        pos: a.pos.iter().chain(b.pos.iter()).copied().collect(),
        tag: a.tag.iter().chain(b.tag.iter()).copied().collect(),
    };
    glued.serialize()
}

/// Map a slot index to its dimension and token position.
pub fn slot_ref(slot: usize, length: usize) -> Result<SlotRef, SignatureError> {
    if length == 0 || slot >= SIGNATURE_BLOCKS * length {
        return Err(SignatureError::SlotOutOfRange { slot, length });
    }
    Ok(SlotRef {
        feature: SIGNATURE_FEATURES[slot / length],
        position: slot % length,
    })
}

/// The signature with the given slots removed. `slots` must be sorted.
/// Requires an exact part count so that masks of different patterns align.
pub fn mask(signature: &str, length: usize, slots: &[usize]) -> Result<String, SignatureError> {
    let blocks = Blocks::parse_exact(signature, length)?;
    let total = SIGNATURE_BLOCKS * length;
    if let Some(&bad) = slots.iter().find(|&&s| s >= total) {
        return Err(SignatureError::SlotOutOfRange { slot: bad, length });
    }
    let mut out = String::with_capacity(signature.len());
    let mut next_mask = slots.iter().peekable();
    let mut first = true;
    for index in 0..total {
        if next_mask.peek() == Some(&&index) {
            next_mask.next();
            continue;
        }
        if !first {
            out.push(SIGNATURE_SEPARATOR);
        }
        first = false;
        out.push_str(blocks.slot(index));
    }
    Ok(out)
}
