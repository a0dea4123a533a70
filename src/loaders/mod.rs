//! One module per dataset family. Each function pins the dataset and
//! forwards to the generic scanner and loader in [`crate::data`].

pub mod ampere;
pub mod laspi;
pub mod metallicadour;
