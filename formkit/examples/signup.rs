//! Signup Example
//!
//! Builds a signup form with nested address fields and a list of
//! interests, feeds it some input, and shows:
//! - Validation on change and on submit
//! - Deferred focus of the first invalid field
//! - Reset back to defaults
//!
//! Field activity is logged to `signup.log`.

use std::fs::File;
use std::sync::Arc;

use formkit::prelude::*;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};

// ============================================================================
// Form definition
// ============================================================================

fn signup_form() -> FormFieldGroup {
    let interests = field_array(field().validator([rules::required(), rules::max_length(20)]))
        .rule(rules::length_between(1, 3).with_message("Pick between one and three interests"));

    field_group()
        .field(
            "email",
            field()
                .transform(|value| value.map(|v| Value::from(v.to_string().trim().to_lowercase())))
                .validator([rules::required(), rules::email()]),
        )
        .field(
            "age",
            field().validator([rules::required(), rules::integer(), rules::min(18.0)]),
        )
        .field("address.city", field().validator([rules::required()]))
        .field("address.country", field().with_default("NO"))
        .field("terms", field().validator([rules::checked()]))
        .field("interests", interests)
        .build()
        .with_name("signup")
}

fn print_state(label: &str, form: &FormFieldGroup) {
    let value = form.value().map(|v| v.to_json()).unwrap_or_default();
    println!("== {label}");
    println!("   value:  {value}");
    println!("   dirty:  {}", form.is_dirty());
    for error in form.errors() {
        println!("   error:  {error}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize file logging
    if let Ok(log_file) = File::create("signup.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);
    }

    let (scheduler, mut wakeup) = Scheduler::with_wakeup();
    let form = signup_form().with_scheduler(scheduler.clone());

    // Stand-ins for UI controls.
    for key in form.keys().map(str::to_string).collect::<Vec<_>>() {
        if let Some(child) = form.get(&key) {
            child.bind_element(Arc::new(move || println!("   focus:  {key}")));
        }
    }

    form.on_field_change(|change| {
        println!("   change: {} = {:?}", change.key, change.value);
    });

    print_state("initial", &form);

    form.patch_value(
        Value::from_json(serde_json::json!({
            "email": "  Kari@Example.COM ",
            "age": "17",
            "address": { "city": "Bergen" },
        }))
        .unwrap_or_else(|| Value::Object(Default::default())),
        true,
    );
    print_state("after typing", &form);

    if !form.validate(true, true) {
        // Focus runs on the next tick.
        if wakeup.recv().await.is_some() {
            wakeup.drain();
            scheduler.run_pending();
        }
    }
    print_state("after submit", &form);

    if let Some(age) = form.get("age") {
        age.set_value(Some("21".into()), true);
    }
    if let Some(terms) = form.get("terms") {
        terms.set_value(Some(true.into()), true);
    }
    if let Some(interests) = form.get("interests") {
        interests.set_value(Some(vec!["climbing", "chess"].into()), true);
    }
    println!("valid: {}", form.validate(true, false));
    print_state("after fixing", &form);

    form.reset();
    print_state("after reset", &form);
}
