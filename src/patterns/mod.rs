use crate::crypto::secure_random_bytes;
use crate::WipeMethod;

/// Content written during a single overwrite pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassPattern {
    /// Every byte of the pass is this value
    Constant(u8),
    /// Cryptographically secure random data, fresh per pass
    Random,
}

impl PassPattern {
    /// Fill `buf` with this pass's content
    pub fn fill(&self, buf: &mut [u8]) -> std::io::Result<()> {
        match self {
            PassPattern::Constant(byte) => {
                buf.fill(*byte);
                Ok(())
            }
            PassPattern::Random => secure_random_bytes(buf).map_err(std::io::Error::other),
        }
    }
}

/// DoD 5220.22-M standard 3-pass sequence
const DOD3_PASSES: [PassPattern; 3] = [
    PassPattern::Constant(0x00),
    PassPattern::Constant(0xFF),
    PassPattern::Random,
];

/// DoD 5220.22-M ECE 7-pass sequence
const DOD7_PASSES: [PassPattern; 7] = [
    PassPattern::Constant(0x00),
    PassPattern::Constant(0xFF),
    PassPattern::Random,
    PassPattern::Constant(0x96),
    PassPattern::Constant(0x00),
    PassPattern::Constant(0xFF),
    PassPattern::Random,
];

/// Pattern for the given zero-indexed pass of `method`.
///
/// Panics if `pass >= method.pass_count()`. Callers iterate over
/// `0..pass_count()`, so an out-of-range pass is a programming error.
pub fn for_pass(method: WipeMethod, pass: u32) -> PassPattern {
    assert!(
        pass < method.pass_count(),
        "pass {} out of range for {:?}",
        pass,
        method
    );
    match method {
        WipeMethod::SinglePass => PassPattern::Constant(0x00),
        WipeMethod::DoD3Pass => DOD3_PASSES[pass as usize],
        WipeMethod::DoD7Pass => DOD7_PASSES[pass as usize],
        WipeMethod::Gutmann => gutmann_pass(pass),
    }
}

/// Gutmann-inspired 35-pass table.
///
/// Passes 1-4 and 32-35 write random data, as in the 1996 paper. The
/// middle passes 5-31 write a constant byte derived as `(pass * 17) % 256`
/// (1-indexed pass number) instead of the paper's MFM/RLL-specific
/// triplets, so the table is Gutmann-inspired rather than table-exact.
fn gutmann_pass(pass: u32) -> PassPattern {
    let pass_num = pass + 1;
    if (5..=31).contains(&pass_num) {
        PassPattern::Constant(((pass_num * 17) % 256) as u8)
    } else {
        PassPattern::Random
    }
}

/// Short label for a pass, used in progress reports and logs
pub fn describe(method: WipeMethod, pass: u32) -> String {
    let total = method.pass_count();
    match for_pass(method, pass) {
        PassPattern::Constant(byte) => {
            format!("Pass {}/{}: writing 0x{:02X}", pass + 1, total, byte)
        }
        PassPattern::Random => format!("Pass {}/{}: writing random data", pass + 1, total),
    }
}
