//! # Report Module
//!
//! Presentation of a measurement: the statistics table printed on stdout
//! and, with the `plot` feature, a PNG chart of the revolution times.

pub mod table;
pub use table::{insufficient_peaks_message, Precision, StatsReport};

#[cfg(feature = "plot")]
pub mod canvas;
#[cfg(feature = "plot")]
pub mod font;
#[cfg(feature = "plot")]
pub mod plot;
#[cfg(feature = "plot")]
pub use plot::{default_plot_path, IntervalPlot, PlotAxes};
