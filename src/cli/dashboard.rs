//! Terminal dashboard: a form over the fitted pipeline
//!
//! Field groups, options and defaults follow the customer record. The form
//! keeps running when no model is available and reports it on submit.

use std::path::Path;

use anyhow::Result;
use console::style;

use super::prompts::{confirm_step, input_amount, input_integer, select_option};
use crate::inference::{load_model, predict_customer, CustomerRecord, Prediction, RiskLevel};
use crate::pipeline::FittedPipeline;
use crate::utils::{print_info, print_step_header, print_success, print_warning};

const GENDER: &[&str] = &["Male", "Female"];
const YES_NO: &[&str] = &["Yes", "No"];
const MULTIPLE_LINES: &[&str] = &["No", "Yes", "No phone service"];
const INTERNET_SERVICE: &[&str] = &["DSL", "Fiber optic", "No"];
const ADD_ON: &[&str] = &["No", "Yes", "No internet service"];
const CONTRACT: &[&str] = &["Month-to-month", "One year", "Two year"];
const PAYMENT_METHOD: &[&str] = &[
    "Electronic check",
    "Mailed check",
    "Bank transfer (automatic)",
    "Credit card (automatic)",
];

pub const MAX_TENURE_MONTHS: i64 = 72;

/// Result of one form submission
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Predicted(Prediction),
    ModelNotLoaded,
    Failed(String),
}

/// Score a submitted record without ever failing the form
pub fn submit(model: Option<&FittedPipeline>, record: &CustomerRecord) -> FormOutcome {
    let Some(model) = model else {
        return FormOutcome::ModelNotLoaded;
    };
    match predict_customer(model, record) {
        Ok(prediction) => FormOutcome::Predicted(prediction),
        Err(e) => FormOutcome::Failed(e.to_string()),
    }
}

/// Lines shown for an outcome
pub fn outcome_lines(outcome: &FormOutcome) -> Vec<String> {
    match outcome {
        FormOutcome::Predicted(p) => vec![
            format!("Churn: {}", if p.churn_prediction { "Yes" } else { "No" }),
            format!("Probability: {:.1}%", p.churn_probability * 100.0),
            format!("Risk level: {}", p.risk_level),
        ],
        FormOutcome::ModelNotLoaded => vec!["Model not loaded.".to_string()],
        FormOutcome::Failed(msg) => vec![format!("Prediction failed: {}", msg)],
    }
}

/// Run the interactive form until the user stops
pub fn run_dashboard(model_path: Option<&Path>, base_dir: &Path) -> Result<()> {
    println!();
    println!(
        "    {}",
        style("Customer Churn Prediction").cyan().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());

    let model = match load_model(model_path, base_dir) {
        Ok((path, pipeline)) => {
            print_success(&format!(
                "Loaded {} from {}",
                pipeline.model_name(),
                path.display()
            ));
            Some(pipeline)
        }
        Err(e) => {
            print_warning(&format!("{}", e));
            None
        }
    };

    let mut record = CustomerRecord::default();
    loop {
        record = prompt_record(&record)?;
        let outcome = submit(model.as_ref(), &record);
        display_outcome(&outcome);

        if !confirm_step("Predict another customer?")? {
            break;
        }
    }

    print_info("Dashboard closed");
    Ok(())
}

/// Collect every field, starting from the previous submission's values
fn prompt_record(previous: &CustomerRecord) -> Result<CustomerRecord> {
    print_step_header(1, "Demographics");
    let gender = select_option("Gender", GENDER, &previous.gender)?;
    let senior = select_option(
        "Senior citizen",
        &["0", "1"],
        &previous.senior_citizen.to_string(),
    )?;
    let partner = select_option("Partner", YES_NO, &previous.partner)?;
    let dependents = select_option("Dependents", YES_NO, &previous.dependents)?;

    print_step_header(2, "Account");
    let tenure = input_integer("Tenure (months)", previous.tenure, 0, MAX_TENURE_MONTHS)?;
    let contract = select_option("Contract", CONTRACT, &previous.contract)?;
    let paperless_billing = select_option("Paperless billing", YES_NO, &previous.paperless_billing)?;
    let payment_method = select_option("Payment method", PAYMENT_METHOD, &previous.payment_method)?;
    let monthly_charges = input_amount("Monthly charges", previous.monthly_charges)?;
    let total_charges = input_amount("Total charges", previous.total_charges)?;

    print_step_header(3, "Services");
    let phone_service = select_option("Phone service", YES_NO, &previous.phone_service)?;
    let multiple_lines = select_option("Multiple lines", MULTIPLE_LINES, &previous.multiple_lines)?;
    let internet_service = select_option("Internet service", INTERNET_SERVICE, &previous.internet_service)?;
    let online_security = select_option("Online security", ADD_ON, &previous.online_security)?;
    let online_backup = select_option("Online backup", ADD_ON, &previous.online_backup)?;
    let device_protection = select_option("Device protection", ADD_ON, &previous.device_protection)?;
    let tech_support = select_option("Tech support", ADD_ON, &previous.tech_support)?;
    let streaming_tv = select_option("Streaming TV", ADD_ON, &previous.streaming_tv)?;
    let streaming_movies = select_option("Streaming movies", ADD_ON, &previous.streaming_movies)?;

    Ok(CustomerRecord {
        gender,
        senior_citizen: if senior == "1" { 1 } else { 0 },
        partner,
        dependents,
        tenure,
        phone_service,
        multiple_lines,
        internet_service,
        online_security,
        online_backup,
        device_protection,
        tech_support,
        streaming_tv,
        streaming_movies,
        contract,
        paperless_billing,
        payment_method,
        monthly_charges,
        total_charges,
    })
}

fn display_outcome(outcome: &FormOutcome) {
    println!();
    let lines = outcome_lines(outcome);
    match outcome {
        FormOutcome::Predicted(p) => {
            let colored = |s: &str| match p.risk_level {
                RiskLevel::High => style(s.to_string()).red().bold(),
                RiskLevel::Medium => style(s.to_string()).yellow().bold(),
                RiskLevel::Low => style(s.to_string()).green().bold(),
            };
            for line in &lines {
                println!("    {}", colored(line));
            }
        }
        FormOutcome::ModelNotLoaded | FormOutcome::Failed(_) => {
            for line in &lines {
                print_warning(line);
            }
        }
    }
    println!();
}
