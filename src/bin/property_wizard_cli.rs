use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    env,
    io::{self, Read},
    path::{Path, PathBuf},
    process,
};

use property_wizard::{
    api::{ApiEnvelope, PropertyApi, RecordFetcher, ServerProperty},
    errors::ApiError,
    init,
    utils::{build_info, persistence},
    wizard::{
        validate, Fragment, HydrationAdapter, PreviewTracker, PropertyRecord, StepRegistry,
        StepView, WizardAction, WizardController, WizardEngine, WizardInteraction, WizardNotice,
        WizardResult,
    },
};
use serde_json::{json, Value};

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let command = args.next().unwrap_or_else(|| {
        print_usage();
        process::exit(1);
    });

    match command.as_str() {
        "version" | "--version" => {
            println!("{}", build_info::current().summary());
        }
        "steps" => {
            let registry = match args.next().as_deref() {
                Some("edit") => StepRegistry::edit_flow(),
                Some("create") | None => StepRegistry::create_flow(),
                Some(_) => {
                    print_usage();
                    process::exit(1);
                }
            };
            for (index, step) in registry.steps().iter().enumerate() {
                println!("{}. {} ({})", index + 1, step.title, step.id);
            }
        }
        "validate" => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            let fragment: Fragment = serde_json::from_str(&buffer)?;
            let result = validate(fragment.step(), &fragment);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.valid {
                process::exit(2);
            }
        }
        "run" => {
            let script = args.next().map(PathBuf::from).unwrap_or_else(|| {
                print_usage();
                process::exit(1);
            });
            let mut options = RunOptions::default();
            while let Some(flag) = args.next() {
                match (flag.as_str(), args.next()) {
                    ("--fail", Some(message)) => options.failures.push_back(message),
                    ("--edit", Some(path)) => options.edit = Some(PathBuf::from(path)),
                    ("--out", Some(path)) => options.out = Some(PathBuf::from(path)),
                    _ => {
                        print_usage();
                        process::exit(1);
                    }
                }
            }
            run_script(&script, options)?;
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }

    Ok(())
}

#[derive(Default)]
struct RunOptions {
    failures: VecDeque<String>,
    edit: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn run_script(script: &Path, options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let actions: Vec<WizardAction> = persistence::load_json(script)?
        .ok_or_else(|| format!("script {} not found", script.display()))?;

    let backend = LocalBackend::new(options.failures);
    let previews = PreviewTracker::new();
    let controller = match &options.edit {
        Some(path) => {
            let property: ServerProperty = persistence::load_json(path)?
                .ok_or_else(|| format!("record {} not found", path.display()))?;
            let record_id = property.record_id().unwrap_or("local").to_string();
            backend.seed(property);
            HydrationAdapter::new(&backend).open_editor(&record_id, previews)?
        }
        None => WizardController::create(previews),
    };

    let mut interaction = ScriptInteraction::new(actions);
    let result = WizardEngine::new(&backend).run(controller, &mut interaction)?;
    match result {
        WizardResult::Completed(data) => {
            println!("Property saved.");
            if let Some(record) = backend.last_saved() {
                println!("{}", serde_json::to_string_pretty(&record)?);
                if let Some(out) = &options.out {
                    persistence::save_json(&record, out)?;
                    println!("Saved record to {}", out.display());
                }
            }
            if let Some(data) = data {
                println!("Server data: {data}");
            }
        }
        WizardResult::Abandoned => println!("Wizard abandoned."),
    }
    Ok(())
}

/// Replays scripted actions; an exhausted script abandons the wizard.
struct ScriptInteraction {
    actions: VecDeque<WizardAction>,
}

impl ScriptInteraction {
    fn new(actions: Vec<WizardAction>) -> Self {
        Self {
            actions: actions.into(),
        }
    }
}

impl WizardInteraction for ScriptInteraction {
    fn next_action(&mut self, view: &StepView<'_>) -> WizardAction {
        println!(
            "[{}/{}] {}",
            view.index + 1,
            view.total,
            view.descriptor.title
        );
        self.actions.pop_front().unwrap_or(WizardAction::Abandon)
    }

    fn report(&mut self, notice: &WizardNotice) {
        match notice {
            WizardNotice::Advanced { to } => println!("  ok, next: {to}"),
            WizardNotice::Rejected { step, errors } => {
                println!("  {step} rejected:");
                for (field, message) in &errors.errors {
                    println!("    {field}: {message}");
                }
            }
            WizardNotice::MovedBack { to } => println!("  back to {to}"),
            WizardNotice::AlreadyAtFirstStep => println!("  already at the first step"),
            WizardNotice::SubmissionFailed(message) => println!("  submission failed: {message}"),
            WizardNotice::Completed => println!("  submitted"),
            WizardNotice::Ignored => println!("  ignored, submission in flight"),
            WizardNotice::NotAvailable(message) => println!("  not available: {message}"),
        }
    }
}

/// In-process stand-in for the property service.
///
/// Queued failure messages are returned by the next saves, in order.
struct LocalBackend {
    failures: RefCell<VecDeque<String>>,
    seeded: RefCell<Option<ServerProperty>>,
    saved: RefCell<Vec<PropertyRecord>>,
    next_id: Cell<u32>,
}

impl LocalBackend {
    fn new(failures: VecDeque<String>) -> Self {
        Self {
            failures: RefCell::new(failures),
            seeded: RefCell::new(None),
            saved: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    fn seed(&self, property: ServerProperty) {
        *self.seeded.borrow_mut() = Some(property);
    }

    fn last_saved(&self) -> Option<PropertyRecord> {
        self.saved.borrow().last().cloned()
    }

    fn save(&self, id: String, record: &PropertyRecord) -> Result<ApiEnvelope<Value>, ApiError> {
        if let Some(message) = self.failures.borrow_mut().pop_front() {
            return Ok(ApiEnvelope::failure(message));
        }
        self.saved.borrow_mut().push(record.clone());
        Ok(ApiEnvelope::ok(json!({ "id": id })))
    }
}

impl PropertyApi for LocalBackend {
    fn create(&self, record: &PropertyRecord) -> Result<ApiEnvelope<Value>, ApiError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.save(format!("local-{id}"), record)
    }

    fn update(&self, id: &str, record: &PropertyRecord) -> Result<ApiEnvelope<Value>, ApiError> {
        self.save(id.to_string(), record)
    }
}

impl RecordFetcher for LocalBackend {
    fn fetch_by_id(&self, id: &str) -> Result<ApiEnvelope<ServerProperty>, ApiError> {
        match self.seeded.borrow().clone() {
            Some(property) => Ok(ApiEnvelope::ok(property)),
            None => Ok(ApiEnvelope::failure(format!("Property {id} not found"))),
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage: property_wizard_cli <command>\n\
         Commands:\n  \
         version\n  \
         steps [create|edit]\n  \
         validate < fragment.json\n  \
         run <script.json> [--fail <message>]... [--edit <record.json>] [--out <file.json>]"
    );
}
