//! Sample employee data for trying out policies

use crate::domain::{Column, Scalar, Table};
use crate::masking::synthetic::{fake_address, fake_ssn};
use chrono::{Datelike, Duration, Local, NaiveDate};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;

pub const DEPARTMENTS: [&str; 5] = ["Engineering", "Sales", "Marketing", "HR", "Finance"];

pub const SAMPLE_COLUMNS: [&str; 11] = [
    "employee_id",
    "first_name",
    "last_name",
    "email",
    "phone",
    "ssn",
    "salary",
    "date_of_birth",
    "age",
    "address",
    "department",
];

/// Generate `rows` employees with the given generator
///
/// Seeding the generator makes the table reproducible.
pub fn generate_employee_table<R: Rng + ?Sized>(rows: usize, rng: &mut R) -> Table {
    generate_employee_table_on(rows, Local::now().date_naive(), rng)
}

/// Same as [`generate_employee_table`] with an explicit "today" for ages
pub fn generate_employee_table_on<R: Rng + ?Sized>(
    rows: usize,
    today: NaiveDate,
    rng: &mut R,
) -> Table {
    let mut columns: Vec<Vec<Scalar>> = vec![Vec::with_capacity(rows); SAMPLE_COLUMNS.len()];

    for i in 1..=rows {
        let age: i64 = rng.gen_range(25..=65);
        let days_into_year: i64 = rng.gen_range(0..365);
        let date_of_birth = birth_date(today, age, days_into_year);

        let first_name: String = FirstName().fake_with_rng(rng);
        let last_name: String = LastName().fake_with_rng(rng);
        let email: String = SafeEmail().fake_with_rng(rng);
        let phone: String = PhoneNumber().fake_with_rng(rng);
        let ssn = fake_ssn(rng);
        let salary: i64 = rng.gen_range(30_000..=150_000);
        let address = fake_address(rng);
        let department = DEPARTMENTS[rng.gen_range(0..DEPARTMENTS.len())];

        let row = [
            Scalar::Text(format!("EMP{i:04}")),
            Scalar::Text(first_name),
            Scalar::Text(last_name),
            Scalar::Text(email),
            Scalar::Text(phone),
            Scalar::Text(ssn),
            Scalar::Integer(salary),
            Scalar::Date(date_of_birth),
            Scalar::Integer(age),
            Scalar::Text(address),
            Scalar::from(department),
        ];
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }

    let columns = SAMPLE_COLUMNS
        .iter()
        .zip(columns)
        .map(|(name, values)| Column::new(*name, values))
        .collect();
    Table::from_derived(columns, rows)
}

fn birth_date(today: NaiveDate, age: i64, days_into_year: i64) -> NaiveDate {
    let anchor = today
        .with_year(today.year() - age as i32)
        .unwrap_or_else(|| today - Duration::days(age * 365));
    anchor - Duration::days(days_into_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_shape_and_ids() {
        let mut rng = StdRng::seed_from_u64(7);
        let table = generate_employee_table_on(12, today(), &mut rng);

        assert_eq!(table.row_count(), 12);
        assert_eq!(table.column_names(), SAMPLE_COLUMNS.to_vec());
        let ids = table.column("employee_id").unwrap().values();
        assert_eq!(ids[0], Scalar::from("EMP0001"));
        assert_eq!(ids[11], Scalar::from("EMP0012"));
    }

    #[test]
    fn test_value_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        let table = generate_employee_table_on(40, today(), &mut rng);

        for value in table.column("salary").unwrap().values() {
            let Scalar::Integer(salary) = value else {
                panic!("salary should be an integer");
            };
            assert!((30_000..=150_000).contains(salary));
        }
        for value in table.column("department").unwrap().values() {
            assert!(DEPARTMENTS.contains(&value.to_string().as_str()));
        }
        for value in table.column("date_of_birth").unwrap().values() {
            let Scalar::Date(dob) = value else {
                panic!("date_of_birth should be a date");
            };
            let days = (today() - *dob).num_days();
            assert!((24 * 365..=66 * 366).contains(&days), "{days} days out of range");
        }
        for value in table.column("ssn").unwrap().values() {
            assert_eq!(value.to_string().len(), 11);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_employee_table_on(5, today(), &mut StdRng::seed_from_u64(3));
        let b = generate_employee_table_on(5, today(), &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_rows() {
        let table = generate_employee_table_on(0, today(), &mut StdRng::seed_from_u64(1));
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), SAMPLE_COLUMNS.len());
    }
}
