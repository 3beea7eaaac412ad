//! progress reporting for long-running beam searches / batch explanations,
//! gated behind the `progress` feature exactly as the teacher gates
//! `indicatif` behind its `native` feature.

#[cfg(feature = "progress")]
pub fn bar(n: usize) -> indicatif::ProgressBar {
    let style = "{spinner:.cyan} {elapsed} ~ {percent:>3}% {wide_bar:.cyan} {pos}/{len}";
    let style = indicatif::ProgressStyle::with_template(style).unwrap();
    let bar = indicatif::ProgressBar::new(n as u64);
    bar.set_style(style);
    bar
}

#[cfg(not(feature = "progress"))]
pub fn bar(_n: usize) -> NullProgress {
    NullProgress
}

/// no-op stand-in so callers can call `.inc(1)` / `.finish()` unconditionally
/// without matching on the `progress` feature at every call site.
#[cfg(not(feature = "progress"))]
pub struct NullProgress;

#[cfg(not(feature = "progress"))]
impl NullProgress {
    pub fn inc(&self, _n: u64) {}
    pub fn finish(&self) {}
}
