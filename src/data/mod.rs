/// Data layer: metadata discovery, splitting and array assembly.
///
/// Architecture:
/// ```text
///  <root>/<case>/<subcase>/*.csv
///        │
///        ▼
///   ┌──────────┐
///   │ scanner  │  folder names → MetadataTable + ClassMapping
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ splitter │  stratified train / test tables
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  reader per file → (files, rows, cols) + labels
///   └──────────┘
/// ```
pub mod loader;
pub mod model;
pub mod naming;
pub mod reader;
pub mod scanner;
pub mod splitter;
