/// Contains the chart tree writer.
pub mod chart;

/// Contains the release record decoder.
pub mod codec;

/// Contains the chart archive packagers.
pub mod package;

/// Contains the types of a Helm release record.
pub mod release;
