use std::collections::HashSet;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;
use client::api::ApiClient;
use client::app::App;
use client::storage::FileStorage;
use client::upload::UploadClient;

type ChatApp = App<FileStorage>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let base_url =
        env::var("DOCMUSE_API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let storage_path =
        env::var("DOCMUSE_STORAGE").unwrap_or_else(|_| "docmuse-client.json".to_string());
    let uploader = env::var("DOCMUSE_UPLOAD_URL").ok().map(UploadClient::new);

    let storage = FileStorage::open(&storage_path)?;
    let mut app = App::new(ApiClient::new(base_url), storage);
    // Hosted URLs uploaded during this run, so /delete knows which entries
    // also have a remote file to drop.
    let mut hosted: HashSet<String> = HashSet::new();

    println!("Chat with your PDF");
    print_help();
    print_documents(&app);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('/') {
            let mut parts = rest.splitn(2, ' ');
            let command = parts.next().unwrap_or("");
            let argument = parts.next().unwrap_or("").trim();
            match command {
                "add" => add_document(&mut app, argument).await,
                "upload" => upload_document(&mut app, &uploader, &mut hosted, argument).await,
                "select" => select_document(&mut app, argument).await,
                "delete" => delete_document(&mut app, &uploader, &mut hosted, argument).await,
                "list" => print_documents(&app),
                "key" => match app.set_api_key(argument) {
                    Ok(()) => println!("API key saved."),
                    Err(err) => eprintln!("{err}"),
                },
                "quit" | "exit" => break,
                _ => print_help(),
            }
        } else {
            ask(&mut app, line).await;
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  /add <url>       add a PDF by URL");
    println!("  /upload <path>   upload a local PDF and add it");
    println!("  /select <n>      switch to document n");
    println!("  /delete <n>      remove document n");
    println!("  /list            show your documents");
    println!("  /key <api key>   store your completion API key");
    println!("  /quit            exit");
    println!("Anything else is asked as a question about the selected PDF.");
}

fn print_documents(app: &ChatApp) {
    if app.library.documents().is_empty() {
        println!("No PDFs added yet");
        return;
    }
    println!("Your documents:");
    for (index, document) in app.library.documents().iter().enumerate() {
        let marker = if app.library.selected() == Some(document.url.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {index}: {} ({})", document.title, document.url);
    }
}

async fn add_document(app: &mut ChatApp, url: &str) {
    if url.is_empty() {
        println!("usage: /add <url>");
        return;
    }
    println!("Processing...");
    match app.add_document(url).await {
        Ok(document) => println!("Added \"{}\"", document.title),
        Err(err) => eprintln!("{err}"),
    }
}

async fn upload_document(
    app: &mut ChatApp,
    uploader: &Option<UploadClient>,
    hosted: &mut HashSet<String>,
    path: &str,
) {
    let Some(uploader) = uploader else {
        println!("Set DOCMUSE_UPLOAD_URL to enable uploads.");
        return;
    };
    if path.is_empty() {
        println!("usage: /upload <path>");
        return;
    }

    let filename = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.pdf")
        .to_string();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{path}: {err}");
            return;
        }
    };

    println!("Processing...");
    match uploader.upload(&filename, bytes).await {
        Ok(hosted_url) => {
            hosted.insert(hosted_url.clone());
            add_document(app, &hosted_url).await;
        }
        Err(err) => eprintln!("{err}"),
    }
}

async fn select_document(app: &mut ChatApp, argument: &str) {
    let Some(url) = document_url(app, argument) else {
        println!("usage: /select <n> (see /list)");
        return;
    };
    match app.select_document(&url).await {
        Ok(()) => println!("Document Connected"),
        Err(err) => eprintln!("{err}"),
    }
}

async fn delete_document(
    app: &mut ChatApp,
    uploader: &Option<UploadClient>,
    hosted: &mut HashSet<String>,
    argument: &str,
) {
    let Some(url) = document_url(app, argument) else {
        println!("usage: /delete <n> (see /list)");
        return;
    };
    match app.delete_document(&url) {
        Ok(_) => println!("Deleted."),
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    }
    if hosted.remove(&url) {
        if let Some(uploader) = uploader {
            if let Err(err) = uploader.delete(&url).await {
                log::warn!("could not delete hosted file {url}: {err}");
            }
        }
    }
}

async fn ask(app: &mut ChatApp, question: &str) {
    if app.library.selected().is_none() {
        println!("Select a PDF to begin.");
        return;
    }
    println!("Almost there! Gathering the info for you...");
    match app.ask(question).await {
        Ok(answer) => println!("{answer}"),
        Err(err) => eprintln!("{err}"),
    }
}

fn document_url(app: &ChatApp, argument: &str) -> Option<String> {
    let index: usize = argument.parse().ok()?;
    app.library.get(index).map(|document| document.url.clone())
}
