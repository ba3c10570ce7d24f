//! Code Generation Module
//!
//! Derives short codes from long URLs.
//!
//! ## Scheme
//! ```text
//!   long_url ──CRC-32/IEEE──► u32 ──lower hex──► base code
//!                                                    │
//!                        taken? append '1' and retry ◄┘
//! ```
//!
//! The hash is computed over the UTF-8 bytes of the URL, so a given URL
//! maps to the same base code in every process and every implementation
//! that uses CRC-32/IEEE. The hex form is not zero-padded
//! (`0x0000beef` becomes `"beef"`).
//!
//! Collisions are resolved by linear probing on the code string: each
//! retry appends [`DISAMBIGUATOR`]. Under adversarial collisions codes
//! grow one character per colliding URL. Every retry yields a strictly
//! longer, hence new, candidate, so probing against a finite index always
//! ends; `max_probe_attempts` additionally caps it.

mod hasher;
mod probe;

pub use hasher::{base_code, CodeHasher, Crc32Hasher};
pub use probe::{resolve_code, Probe, DISAMBIGUATOR};
