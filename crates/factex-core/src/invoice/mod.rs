//! Invoice extraction: classification, segmentation, field cascades,
//! line-item grammars, reconciliation and assembly.

pub mod assembler;
pub mod classifier;
pub mod fields;
pub mod items;
pub mod reconcile;
pub mod rules;
pub mod segmenter;

pub use assembler::{assemble, error_record};
pub use classifier::classify;
pub use fields::{field_extractor_for, FieldExtractor, FieldSet};
pub use items::{line_item_parser_for, LineItemParser};
pub use reconcile::reconcile;
pub use segmenter::segment;
