//! Account commands run from the command line.

use crate::cli::{CreateWorkerArgs, SetPasswordArgs};
use crate::db::Database;
use crate::forms::{FormData, WorkerCreationForm};
use crate::password::hash_password;
use crate::types::Worker;
use anyhow::{Result, bail};
use tracing::info;

/// Create an account with the same checks as the registration form.
pub fn create_worker(db: &Database, args: &CreateWorkerArgs) -> Result<Worker> {
    let data = FormData::from_pairs(vec![
        ("username".into(), args.username.clone()),
        ("password1".into(), args.password.clone()),
        ("password2".into(), args.password.clone()),
        ("first_name".into(), args.first_name.clone()),
        ("last_name".into(), args.last_name.clone()),
        ("email".into(), args.email.clone()),
    ]);

    let form = WorkerCreationForm::new(&[]);
    let new_worker = match form.clean(&data, |username| db.username_exists(username, None))? {
        Ok(new_worker) => new_worker,
        Err(errors) => {
            let messages: Vec<String> = errors
                .iter()
                .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field}: {m}")))
                .collect();
            bail!("Cannot create worker: {}", messages.join("; "));
        }
    };

    let hash = hash_password(&new_worker.password)?;
    let worker = db.create_worker(&new_worker.input, &hash)?;
    info!(worker_id = worker.id, username = %worker.username, "Worker created");
    Ok(worker)
}

/// Replace an existing worker's password.
pub fn set_password(db: &Database, args: &SetPasswordArgs) -> Result<Worker> {
    if args.password.is_empty() {
        bail!("Password must not be empty");
    }
    let Some((worker, _)) = db.get_worker_credentials(&args.username)? else {
        bail!("No worker named {}", args.username);
    };
    let hash = hash_password(&args.password)?;
    if !db.set_worker_password(worker.id, &hash)? {
        bail!("Worker {} disappeared", args.username);
    }
    info!(worker_id = worker.id, username = %worker.username, "Password changed");
    Ok(worker)
}
