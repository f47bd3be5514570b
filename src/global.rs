/// magnitude below which a floating point value is treated as zero by sign queries
pub const THRESHOLD: f64 = 1e-10;
/// relative residual accepted when pairing approximate roots of the two eliminants
pub const RESIDUAL_TOLERANCE: f64 = 1e-8;
/// largest degree of an eliminant (resultant) the solver is allowed to build
pub const MAX_DEGREE: usize = 64;
/// iteration cap of the polynomial root finder
pub const MAX_ROOT_ITERATIONS: usize = 500;
/// integer powers of multi-term bases above this are kept unexpanded by the simplifier
pub const MAX_EXPANSION_POWER: u32 = 16;
