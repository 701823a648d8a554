//! Synthetic replacement values
//!
//! The category of a fake value is inferred from the field name alone, by
//! case-insensitive substring match in this order: email, phone, name
//! (first / last / full), address, ssn, company, then a generic word.

use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;

/// Kind of synthetic value drawn for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeCategory {
    Email,
    Phone,
    FirstName,
    LastName,
    FullName,
    Address,
    Ssn,
    Company,
    Word,
}

impl FakeCategory {
    /// Infer the category from a field name
    pub fn for_field(field_name: &str) -> Self {
        let lower = field_name.to_lowercase();

        if lower.contains("email") {
            FakeCategory::Email
        } else if lower.contains("phone") {
            FakeCategory::Phone
        } else if lower.contains("name") {
            if lower.contains("first") {
                FakeCategory::FirstName
            } else if lower.contains("last") {
                FakeCategory::LastName
            } else {
                FakeCategory::FullName
            }
        } else if lower.contains("address") {
            FakeCategory::Address
        } else if lower.contains("ssn") {
            FakeCategory::Ssn
        } else if lower.contains("company") {
            FakeCategory::Company
        } else {
            FakeCategory::Word
        }
    }

    /// Draw a fresh value of this category
    pub fn generate<R: Rng + ?Sized>(self, rng: &mut R) -> String {
        match self {
            FakeCategory::Email => SafeEmail().fake_with_rng(rng),
            FakeCategory::Phone => PhoneNumber().fake_with_rng(rng),
            FakeCategory::FirstName => FirstName().fake_with_rng(rng),
            FakeCategory::LastName => LastName().fake_with_rng(rng),
            FakeCategory::FullName => Name().fake_with_rng(rng),
            FakeCategory::Address => fake_address(rng),
            FakeCategory::Ssn => fake_ssn(rng),
            FakeCategory::Company => CompanyName().fake_with_rng(rng),
            FakeCategory::Word => Word().fake_with_rng(rng),
        }
    }
}

/// One-line US-style street address
pub fn fake_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let number: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    let city: String = CityName().fake_with_rng(rng);
    let state: String = StateAbbr().fake_with_rng(rng);
    let zip: String = ZipCode().fake_with_rng(rng);
    format!("{number} {street}, {city}, {state} {zip}")
}

/// Social security number in `AAA-GG-SSSS` form, avoiding the never-issued
/// area numbers 000, 666 and 900-999
pub fn fake_ssn<R: Rng + ?Sized>(rng: &mut R) -> String {
    let area = loop {
        let candidate: u32 = rng.gen_range(1..900);
        if candidate != 666 {
            break candidate;
        }
    };
    let group: u32 = rng.gen_range(1..100);
    let serial: u32 = rng.gen_range(1..10000);
    format!("{area:03}-{group:02}-{serial:04}")
}
