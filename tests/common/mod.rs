//! Shared test utilities and fixture generators
#![allow(dead_code)]

use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use churnsight::inference::CustomerRecord;
use churnsight::pipeline::DATASET_FILE_NAME;

const YES_NO: [&str; 2] = ["Yes", "No"];
const INTERNET: [&str; 3] = ["DSL", "Fiber optic", "No"];
const CONTRACT: [&str; 3] = ["Month-to-month", "One year", "Two year"];
const PAYMENT: [&str; 4] = [
    "Electronic check",
    "Mailed check",
    "Bank transfer (automatic)",
    "Credit card (automatic)",
];

fn pick<'a>(rng: &mut Xoshiro256PlusPlus, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

/// Synthetic telco-shaped frame.
///
/// Churn leans on month-to-month contracts, fiber service, short tenure and
/// electronic checks, so the candidates have real signal to find. Customers
/// with zero tenure carry a blank `TotalCharges`, as in the source data.
pub fn create_telco_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let mut ids = Vec::with_capacity(rows);
    let mut gender = Vec::with_capacity(rows);
    let mut senior = Vec::with_capacity(rows);
    let mut partner = Vec::with_capacity(rows);
    let mut dependents = Vec::with_capacity(rows);
    let mut tenure = Vec::with_capacity(rows);
    let mut phone = Vec::with_capacity(rows);
    let mut lines = Vec::with_capacity(rows);
    let mut internet = Vec::with_capacity(rows);
    let mut security = Vec::with_capacity(rows);
    let mut backup = Vec::with_capacity(rows);
    let mut protection = Vec::with_capacity(rows);
    let mut support = Vec::with_capacity(rows);
    let mut tv = Vec::with_capacity(rows);
    let mut movies = Vec::with_capacity(rows);
    let mut contract = Vec::with_capacity(rows);
    let mut paperless = Vec::with_capacity(rows);
    let mut payment = Vec::with_capacity(rows);
    let mut monthly = Vec::with_capacity(rows);
    let mut total = Vec::with_capacity(rows);
    let mut churn = Vec::with_capacity(rows);

    for i in 0..rows {
        let t: i64 = if i % 37 == 0 { 0 } else { rng.gen_range(1..=72) };
        let has_phone = pick(&mut rng, &YES_NO);
        let net = pick(&mut rng, &INTERNET);
        let add_on = |rng: &mut Xoshiro256PlusPlus| {
            if net == "No" {
                "No internet service"
            } else {
                pick(rng, &YES_NO)
            }
        };
        let c = pick(&mut rng, &CONTRACT);
        let pay = pick(&mut rng, &PAYMENT);
        let m: f64 = (rng.gen_range(20.0..110.0f64) * 100.0).round() / 100.0;

        let mut p = 0.08;
        if c == "Month-to-month" {
            p += 0.35;
        }
        if net == "Fiber optic" {
            p += 0.15;
        }
        if t < 12 {
            p += 0.15;
        }
        if pay == "Electronic check" {
            p += 0.1;
        }

        ids.push(format!("{:04}-CUST", i));
        gender.push(if rng.gen_bool(0.5) { "Male" } else { "Female" });
        senior.push(i64::from(rng.gen_bool(0.16)));
        partner.push(pick(&mut rng, &YES_NO));
        dependents.push(pick(&mut rng, &YES_NO));
        tenure.push(t);
        phone.push(has_phone);
        lines.push(if has_phone == "No" {
            "No phone service"
        } else {
            pick(&mut rng, &YES_NO)
        });
        internet.push(net);
        security.push(add_on(&mut rng));
        backup.push(add_on(&mut rng));
        protection.push(add_on(&mut rng));
        support.push(add_on(&mut rng));
        tv.push(add_on(&mut rng));
        movies.push(add_on(&mut rng));
        contract.push(c);
        paperless.push(pick(&mut rng, &YES_NO));
        payment.push(pay);
        monthly.push(m);
        total.push(if t == 0 {
            " ".to_string()
        } else {
            format!("{:.2}", m * t as f64)
        });
        churn.push(if rng.gen_bool(p) { "Yes" } else { "No" });
    }

    df! {
        "customerID" => ids,
        "gender" => gender,
        "SeniorCitizen" => senior,
        "Partner" => partner,
        "Dependents" => dependents,
        "tenure" => tenure,
        "PhoneService" => phone,
        "MultipleLines" => lines,
        "InternetService" => internet,
        "OnlineSecurity" => security,
        "OnlineBackup" => backup,
        "DeviceProtection" => protection,
        "TechSupport" => support,
        "StreamingTV" => tv,
        "StreamingMovies" => movies,
        "Contract" => contract,
        "PaperlessBilling" => paperless,
        "PaymentMethod" => payment,
        "MonthlyCharges" => monthly,
        "TotalCharges" => total,
        "Churn" => churn,
    }
    .unwrap()
}

/// Write a frame as CSV
pub fn write_csv(df: &mut DataFrame, path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut file = std::fs::File::create(path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
}

/// Place a synthetic dataset at `<dir>/data/Telco_Customer_Churn_Dataset.csv`
pub fn write_default_dataset(dir: &Path, rows: usize, seed: u64) -> PathBuf {
    let path = dir.join("data").join(DATASET_FILE_NAME);
    let mut df = create_telco_dataframe(rows, seed);
    write_csv(&mut df, &path);
    path
}

/// Temp directory holding a synthetic dataset
pub fn create_temp_dataset(rows: usize) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_default_dataset(temp_dir.path(), rows, 7);
    (temp_dir, path)
}

/// The customer scored in the quick-start walkthrough
pub fn sample_customer() -> CustomerRecord {
    CustomerRecord {
        tenure: 12,
        contract: "Month-to-month".to_string(),
        monthly_charges: 65.0,
        total_charges: 1500.0,
        ..CustomerRecord::default()
    }
}
