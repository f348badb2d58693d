//! Server-assigned integer identifiers.
//!
//! Each resource gets its own newtype so a branch id can never be passed where
//! a product id is expected. On the wire they are plain JSON integers.

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

id_type!(
    /// Identifier of a [`Branch`](crate::models::Branch).
    BranchId
);
id_type!(
    /// Identifier of a [`Product`](crate::models::Product).
    ProductId
);
id_type!(
    /// Identifier of a [`StockRecord`](crate::models::StockRecord).
    StockId
);
id_type!(
    /// Identifier of a [`Sale`](crate::models::Sale).
    SaleId
);
id_type!(
    /// Identifier of a [`User`](crate::models::User).
    UserId
);
