//! Multi-pass overwrite of secret material before release.
//!
//! Invariants:
//! - Every pass writes ASCII only, so a `String` stays valid UTF-8 throughout.
//! - The final pass is always `zeroize`.

use std::sync::atomic::{Ordering, compiler_fence};

use rand::RngExt;
use zeroize::Zeroize;

use crate::constants::WIPE_PASSES;
use crate::value::{EnvironmentMap, TypedValue};

const NOISE_LEN: usize = 64;

fn pass_byte(pass: usize, noise: u8) -> u8 {
    match pass {
        0 => b'*',
        1 => b'U',
        _ => b'A' + noise % 26,
    }
}

/// Overwrite the string's bytes `WIPE_PASSES` times, then zero them.
pub(crate) fn wipe_string(value: &mut String) {
    let mut noise = [0u8; NOISE_LEN];
    rand::rng().fill(&mut noise);

    // SAFETY: every byte written below is ASCII, so the buffer stays valid UTF-8.
    let bytes = unsafe { value.as_mut_vec() };
    for pass in 0..WIPE_PASSES {
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = pass_byte(pass, noise[i % NOISE_LEN]);
        }
        compiler_fence(Ordering::SeqCst);
    }
    noise.zeroize();
    value.zeroize();
}

fn wipe_value(value: &mut TypedValue) {
    match value {
        TypedValue::String(s) => wipe_string(s),
        TypedValue::Integer(n) => {
            *n = i64::MAX;
            compiler_fence(Ordering::SeqCst);
            n.zeroize();
        }
        TypedValue::Boolean(b) => {
            *b = true;
            compiler_fence(Ordering::SeqCst);
            *b = false;
        }
    }
}

/// Consume a map, wiping every key and value.
pub(crate) fn wipe_map(map: EnvironmentMap) {
    for (mut key, mut value) in map {
        wipe_string(&mut key);
        wipe_value(&mut value);
    }
}
