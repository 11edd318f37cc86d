//! Resource records exchanged with the Wave API.
//!
//! Every field is optional so that a record decoded from a response can be
//! sent back without inventing values, and so partial updates only carry the
//! fields that were set. Unknown fields in responses are ignored.

pub mod account;
pub mod address;
pub mod business;
pub mod country;
pub mod currency;
pub mod customer;
pub mod product;
pub mod user;

pub use self::{
    account::Account,
    address::Address,
    business::Business,
    country::{Country, Province},
    currency::Currency,
    customer::{Customer, ShippingDetails},
    product::Product,
    user::{BusinessReference, User, UserEmail, UserProfile},
};
