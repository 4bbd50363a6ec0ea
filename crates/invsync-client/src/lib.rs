//! invsync-client: inventory store client
//!
//! The [`InventoryStore`] trait is the seam between the reconciliation engine
//! and the store; [`HttpStore`] implements it over the store's REST API.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use invsync_client::{HttpStore, InventoryStore, list_stored};
//! use invsync_inventory::{BaseObject, Memory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HttpStore::new("https://ralph.local/api", "secret", Duration::from_secs(10))?;
//! let memory: Vec<Memory> = list_stored(&store, BaseObject(42)).await?;
//! println!("{} memory modules", memory.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod records;
pub mod traits;

pub use error::{ClientError, Result};
pub use http::HttpStore;
pub use records::{BaseObjectRecord, EthernetRef, IpAddressQuery, IpAddressRecord};
pub use traits::{InventoryStore, fetch_one, list_stored};
