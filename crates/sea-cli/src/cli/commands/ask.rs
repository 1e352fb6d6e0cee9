//! Question answering handlers.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use sea_core::api::SeaClient;
use sea_core::markdown;
use sea_core::types::{InferenceInteraction, InferenceResult};

const EXIT_COMMAND: &str = "/exit";

pub async fn ask(client: &SeaClient, question: &str, html: bool) -> Result<()> {
    let history = [InferenceInteraction::user(question)];
    let result = client
        .inference_query(&history)
        .await
        .context("query the assistant")?;

    print_answer(&result, html);
    Ok(())
}

/// Runs a conversation over stdin, one question per line.
///
/// The full history is sent with every question. A failed turn is dropped
/// from the history so the next question does not repeat it.
pub async fn chat(client: &SeaClient, html: bool) -> Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut history: Vec<InferenceInteraction> = Vec::new();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            print!("> ");
            io::stdout().flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("read question from stdin")?;
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == EXIT_COMMAND {
            break;
        }

        history.push(InferenceInteraction::user(question));
        match client.inference_query(&history).await {
            Ok(result) => {
                print_answer(&result, html);
                history.push(InferenceInteraction::agent(result.text));
            }
            Err(e) => {
                history.pop();
                eprintln!("Error: {e}");
            }
        }
    }

    Ok(())
}

fn print_answer(result: &InferenceResult, html: bool) {
    let rendered = result.to_markdown();
    if html {
        println!("{}", markdown::to_html(&rendered));
    } else {
        println!("{rendered}");
    }
}
