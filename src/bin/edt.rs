//! Logs in, refreshes the timetable of the user program and prints it.
//!
//! Settings are read from the environment:
//! * `EDT_API_URL` (defaults to [`edt_fridge::config::API_BASE_URL`])
//! * `EDT_EMAIL` and `EDT_PASSWORD`
//! * `EDT_CACHE_FOLDER` (defaults to `edt_cache`)
//! * `RUST_LOG` to display more info about the refresh

use std::error::Error;
use std::path::Path;

use chrono::Local;

use edt_fridge::auth::{Roles, Session};
use edt_fridge::cache::Cache;
use edt_fridge::client::Client;
use edt_fridge::store::refresh_progress::feedback_channel;
use edt_fridge::EdtStore;

const DEFAULT_CACHE_FOLDER: &str = "edt_cache";

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn required_var(name: &str) -> Result<String, Box<dyn Error>> {
    std::env::var(name).map_err(|_| format!("Environment variable {} must be set", name).into())
}

async fn run() -> Result<(), Box<dyn Error>> {
    if let Ok(url) = std::env::var("EDT_API_URL") {
        if let Ok(mut configured) = edt_fridge::config::API_BASE_URL.lock() {
            *configured = url;
        }
    }
    let email = required_var("EDT_EMAIL")?;
    let password = required_var("EDT_PASSWORD")?;
    let cache_folder = std::env::var("EDT_CACHE_FOLDER").unwrap_or_else(|_| DEFAULT_CACHE_FOLDER.to_string());

    let mut client = Client::from_config()?;
    let auth = client.login(&email, &password).await?;
    let mut session = Session::new();
    session.sign_in(&auth)?;
    println!("Hello {} {}", auth.first_name, auth.last_name);
    if session.roles().contains(Roles::TEACHER) {
        println!("(teacher account: course statuses can be updated)");
    }

    let user_id = session.user_id().ok_or("No user ID in the session")?.to_string();
    let program = client.get_user_program(&user_id).await?;
    println!("Program: {}", program.program_name);

    let cache_path = Path::new(&cache_folder);
    let cache = match Cache::from_folder(cache_path) {
        Ok(cache) => cache,
        Err(err) => {
            log::warn!("Invalid cache folder: {}. Using a default cache", err);
            Cache::new(cache_path)
        }
    };

    let mut store = EdtStore::new(client, cache, program.program_id);
    store.load_from_cache(Local::now());
    println!("---- Cached timetable -----");
    edt_fridge::utils::print_store(&store);

    let (sender, mut receiver) = feedback_channel();
    let listener = tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            println!("  {}", *receiver.borrow());
        }
    });

    println!("Refreshing...");
    if store.refresh_with_feedback(Local::now(), sender).await == false {
        log::warn!("Refresh did not complete, see the previous log lines for more info. Cached data is displayed.");
    }
    // The sender has been dropped, the listener ends by itself
    let _ = listener.await;
    store.local().save_to_folder()?;

    println!("---- Timetable -----");
    edt_fridge::utils::print_store(&store);

    session.sign_out();
    Ok(())
}
