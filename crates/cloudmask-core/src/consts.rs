/// Epsilon used for every floating-point threshold comparison, so pixels
/// sitting exactly on a spectral boundary classify the same way on every run.
pub const MINSIGMA: f32 = 1e-7;

/// Sentinel for pixels outside the sensor footprint.
pub const FILL_PIXEL: i16 = -9999;

/// Low percentile point for the background statistics.
pub const LOW_PERCENT_POINT: f32 = 17.5;

/// High percentile point, the mirror of [`LOW_PERCENT_POINT`].
pub const HIGH_PERCENT_POINT: f32 = 82.5;

/// Widening applied to the clear-land temperature window, in degrees C x 100.
pub const TEMP_BUFFER: f32 = 400.0;
