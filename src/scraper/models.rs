use serde::{Deserialize, Serialize};

// Listing
//  ├── title
//  ├── url            (dedup key)
//  ├── price
//  ├── description
//  ├── address
//  ├── published_date
//  ├── view_count
//  ├── seller_name
//  ├── seller_profile_url
//  └── phone          (always "hidden")

pub const NO_TITLE: &str = "no title";
pub const NO_PRICE: &str = "no price";
pub const NO_DESCRIPTION: &str = "no description";
pub const NO_ADDRESS: &str = "no address";
pub const NO_DATE: &str = "no date";
pub const NO_VIEWS: &str = "no views";
pub const NO_SELLER_NAME: &str = "no seller name";
pub const NO_SELLER_LINK: &str = "no seller link";

/// The site masks contact numbers behind a click; we never try to reveal them.
pub const PHONE_HIDDEN: &str = "hidden";

/// Column order shared by the Excel and CSV exports.
pub const COLUMNS: [&str; 10] = [
    "title",
    "url",
    "price",
    "description",
    "address",
    "published_date",
    "view_count",
    "seller_name",
    "seller_profile_url",
    "phone",
];

/// One classified ad. Every field is always populated; missing source data is
/// replaced with one of the sentinels above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub url: String,
    pub price: String,
    pub description: String,
    pub address: String,
    pub published_date: String,
    pub view_count: String,
    pub seller_name: String,
    pub seller_profile_url: String,
    pub phone: String,
}

impl Listing {
    /// A record with every field set to its sentinel.
    pub fn blank(url: impl Into<String>) -> Self {
        Self {
            title: NO_TITLE.to_string(),
            url: url.into(),
            price: NO_PRICE.to_string(),
            description: NO_DESCRIPTION.to_string(),
            address: NO_ADDRESS.to_string(),
            published_date: NO_DATE.to_string(),
            view_count: NO_VIEWS.to_string(),
            seller_name: NO_SELLER_NAME.to_string(),
            seller_profile_url: NO_SELLER_LINK.to_string(),
            phone: PHONE_HIDDEN.to_string(),
        }
    }

    /// Values in `COLUMNS` order.
    pub fn to_row(&self) -> [&str; 10] {
        [
            self.title.as_str(),
            self.url.as_str(),
            self.price.as_str(),
            self.description.as_str(),
            self.address.as_str(),
            self.published_date.as_str(),
            self.view_count.as_str(),
            self.seller_name.as_str(),
            self.seller_profile_url.as_str(),
            self.phone.as_str(),
        ]
    }
}
