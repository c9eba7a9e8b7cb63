use uuid::Uuid;

/// A postal address shared by clients and suppliers.
///
/// Addresses are keyed by `(country, city, street)`: writers insert-or-reuse
/// by that natural key and never update a row in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub id: Uuid,
    pub country: String,
    pub city: String,
    pub street: String,
}

/// Natural-key data for inserting or reusing an address row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub country: String,
    pub city: String,
    pub street: String,
}

impl NewAddress {
    pub fn new(country: &str, city: &str, street: &str) -> Self {
        Self {
            country: country.trim().to_string(),
            city: city.trim().to_string(),
            street: street.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub address_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub name: String,
    pub surname: String,
    pub email: String,
}

impl NewClient {
    pub fn new(name: &str, surname: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            surname: surname.to_string(),
            email: email.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub address_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSupplier {
    pub name: String,
    pub phone: String,
}

impl NewSupplier {
    pub fn new(name: &str, phone: &str) -> Self {
        Self {
            name: name.to_string(),
            phone: phone.to_string(),
        }
    }
}

/// A catalog product. Price is stored in cents.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub supplier_id: Uuid,
    pub image_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub supplier_id: Uuid,
}

impl NewProduct {
    pub fn new(name: &str, category: &str, price: i64, supplier_id: Uuid) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            price,
            supplier_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub id: Uuid,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub title: String,
    pub url: String,
}

impl NewImage {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
        }
    }
}
