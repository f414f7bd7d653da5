//! Sample catalog storage.
//!
//! The catalog holds the fixed reference samples every document is ultimately
//! attributed to. An invoice catalog is compiled into the binary, and custom
//! catalogs can be loaded from JSON files in the same format.
//!
//! ## Embedded Catalog
//!
//! The default catalog contains six invoice samples, `001` through `006`,
//! covering four customers (two each for "Titan Heavy Industries" and
//! "Bread Co").
//!
//! ## Example
//!
//! ```rust,no_run
//! use sample_matcher::SampleCatalog;
//! use sample_matcher::core::types::SampleId;
//!
//! let catalog = SampleCatalog::load_embedded().unwrap();
//!
//! for sample in catalog.iter() {
//!     println!("{}", sample.id);
//! }
//!
//! let bread_co = catalog.get(&SampleId::new("005"));
//! ```
//!
//! ## Custom Catalogs
//!
//! ```rust,no_run
//! use sample_matcher::SampleCatalog;
//! use std::path::Path;
//!
//! let catalog = SampleCatalog::load_embedded().unwrap();
//! let json = catalog.to_json().unwrap();
//!
//! let custom = SampleCatalog::load_from_file(Path::new("my_samples.json")).unwrap();
//! ```

pub mod store;
