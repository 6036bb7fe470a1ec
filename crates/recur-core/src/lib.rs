pub mod algorithm;
pub mod catalog;
pub mod error;
pub mod notation;
pub mod params;
pub mod sampler;
pub mod theorem;

pub use algorithm::{Algorithm, CatalogStats};
pub use catalog::AlgorithmCatalog;
pub use error::{RecurError, RecurResult};
pub use notation::to_plain_text;
pub use params::RecurrenceParams;
pub use sampler::{sample, PlotSeries, SAMPLE_COUNT};
pub use theorem::{classify, evaluate, Case, Classification, Evaluation};
