//! The three forms of the site
//!
//! | form | table | strategy |
//! |------|-------|----------|
//! | [`ContactForm`] | `contact_requests` | plain insert |
//! | [`FreeSampleForm`] | `sample_requests` | insert unless email + establishment exist |
//! | [`LeadMagnetForm`] | `leads` | insert, then redirect to the signed catalog |

mod contact;
mod free_sample;
mod lead_magnet;

pub use contact::ContactForm;
pub use free_sample::{FreeSampleForm, ESTABLISHMENT_TYPES, PRODUCT_OPTIONS};
pub use lead_magnet::LeadMagnetForm;
