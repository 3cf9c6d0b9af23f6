//! Interactive chat with WILL-LM, a coding assistant backed by Gemini.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! willlm-chat
//!
//! # Specify a model
//! willlm-chat --model gemini-2.5-flash
//!
//! # Show five entries per page
//! willlm-chat --page-size 5
//!
//! # Disable colors (useful for piping output)
//! willlm-chat --no-color
//! ```
//!
//! The API key is read from `WILLLM_API_KEY` or `GEMINI_API_KEY`.  Set
//! `WILLLM_LOG` (e.g. `WILLLM_LOG=willlm=debug`) to control diagnostics on
//! stderr.
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/more` - Show the next page of history
//! - `/model <name>` - Change the model
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use willlm::chat::{
    ChatArgs, ChatCommand, ChatConfig, KeyOutcome, PlainTextRenderer, Renderer,
    SessionController, TurnOutcome, help_text, parse_command, render_window,
};
use willlm::client::api_key_source;
use willlm::{Gemini, GeminiCompletion, Key, Model};

type Session = SessionController<GeminiCompletion>;

/// Main entry point for the willlm-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env("WILLLM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("willlm-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let client = Gemini::with_options(None, config.base_url.clone(), config.timeout)?;
    tracing::debug!(
        key_source = api_key_source().unwrap_or("argument"),
        base_url = %client.base_url(),
        "client ready"
    );
    let completion = GeminiCompletion::new(client, config.model.clone())
        .with_generation_config(config.generation_config());
    let mut session = SessionController::from_config(completion, &config);
    let mut renderer = PlainTextRenderer::with_color(config.use_color)
        .with_labels(config.user_label.clone(), config.assistant_label.clone());
    let mut rl = DefaultEditor::new()?;

    println!("WILL-LM Chat (model: {})", session.client().model());
    println!("Type /help for commands, /quit to exit\n");

    renderer.print_busy(true);
    session.startup().await;
    let mut rendered = session.with_view(|window| render_window(&mut renderer, window, 0));

    let prompt = format!("{}: ", config.user_label);
    let mut continuing = false;
    loop {
        let readline = if continuing {
            rl.readline("... ")
        } else {
            let retained = session.input();
            rl.readline_with_initial(&prompt, (retained.as_str(), ""))
        };

        match readline {
            Ok(line) => {
                if !continuing {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line.as_str());

                    if let Some(cmd) = parse_command(&line) {
                        let quit = matches!(cmd, ChatCommand::Quit);
                        handle_command(cmd, &mut session, &mut renderer, &mut rendered);
                        if quit {
                            break;
                        }
                        continue;
                    }
                    session.set_input("");
                }

                // A trailing backslash continues the prompt on the next line.
                let (text, more) = match line.strip_suffix('\\') {
                    Some(text) => (text, true),
                    None => (line.as_str(), false),
                };
                for c in text.chars() {
                    session.handle_key(Key::Char(c)).await;
                }
                if more {
                    session.handle_key(Key::Enter { shift: true }).await;
                    continuing = true;
                    continue;
                }
                continuing = false;

                session.with_view(|window| renderer.print_busy(window.is_empty()));
                let outcome = session.handle_key(Key::Enter { shift: false }).await;
                match outcome {
                    KeyOutcome::Submitted(TurnOutcome::Completed) => {
                        rendered = session
                            .with_view(|window| render_window(&mut renderer, window, rendered));
                    }
                    KeyOutcome::Submitted(TurnOutcome::Failed) => {
                        renderer.print_info("Request failed; your input was kept for a retry.");
                    }
                    _ => {}
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt abandons a multi-line entry.
                if continuing {
                    session.set_input("");
                    continuing = false;
                }
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn handle_command(
    cmd: ChatCommand,
    session: &mut Session,
    renderer: &mut PlainTextRenderer,
    rendered: &mut usize,
) {
    match cmd {
        ChatCommand::Quit => {
            println!("Goodbye!");
        }
        ChatCommand::Help => {
            for line in help_text().lines() {
                println!("    {}", line);
            }
        }
        ChatCommand::More => {
            if session.reveal_more() {
                *rendered = session.with_view(|window| render_window(renderer, window, *rendered));
            } else {
                renderer.print_info("Nothing more to show.");
            }
        }
        ChatCommand::View => {
            *rendered = session.with_view(|window| render_window(renderer, window, 0));
        }
        ChatCommand::Model(model_name) => {
            session.client_mut().set_model(Model::from(model_name.as_str()));
            renderer.print_info(&format!("Model changed to: {}", model_name));
        }
        ChatCommand::MaxTokens(value) => {
            session.client_mut().generation_config_mut().max_output_tokens = Some(value);
            renderer.print_info(&format!("max_tokens set to {value}"));
        }
        ChatCommand::ClearMaxTokens => {
            session.client_mut().generation_config_mut().max_output_tokens = None;
            renderer.print_info("max_tokens reset to model default");
        }
        ChatCommand::Temperature(value) => {
            session.client_mut().generation_config_mut().temperature = Some(value);
            renderer.print_info(&format!("temperature set to {:.2}", value));
        }
        ChatCommand::ClearTemperature => {
            session.client_mut().generation_config_mut().temperature = None;
            renderer.print_info("temperature reset to model default");
        }
        ChatCommand::TopP(value) => {
            session.client_mut().generation_config_mut().top_p = Some(value);
            renderer.print_info(&format!("top_p set to {:.2}", value));
        }
        ChatCommand::ClearTopP => {
            session.client_mut().generation_config_mut().top_p = None;
            renderer.print_info("top_p reset to model default");
        }
        ChatCommand::TopK(value) => {
            session.client_mut().generation_config_mut().top_k = Some(value);
            renderer.print_info(&format!("top_k set to {value}"));
        }
        ChatCommand::ClearTopK => {
            session.client_mut().generation_config_mut().top_k = None;
            renderer.print_info("top_k reset to model default");
        }
        ChatCommand::AddStopSequence(sequence) => {
            let stops = &mut session.client_mut().generation_config_mut().stop_sequences;
            if !stops.contains(&sequence) {
                stops.push(sequence.clone());
            }
            renderer.print_info(&format!("Added stop sequence: {sequence}"));
        }
        ChatCommand::ClearStopSequences => {
            session
                .client_mut()
                .generation_config_mut()
                .stop_sequences
                .clear();
            renderer.print_info("Stop sequences cleared.");
        }
        ChatCommand::ListStopSequences => {
            print_stop_sequences(&session.client().generation_config().stop_sequences);
        }
        ChatCommand::Stats => {
            print_stats(session);
        }
        ChatCommand::ShowConfig => {
            print_config(session);
        }
        ChatCommand::Invalid(message) => {
            renderer.print_error(&message);
        }
    }
}

fn print_stats(session: &Session) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", session.client().model());
    println!("      Status: {}", stats.status);
    println!(
        "      Entries: {} ({} visible, page {} of size {})",
        stats.entry_count, stats.visible_count, stats.current_page, stats.page_size
    );
    println!(
        "      Turns: {} completed, {} failed, {} abandoned",
        stats.completed_turns, stats.failed_turns, stats.abandoned_turns
    );
    println!(
        "      Ignored: {} while busy, {} blank",
        stats.ignored_busy, stats.ignored_empty
    );
    match stats.last_error {
        Some(ref error) => println!("      Last error: {}", error),
        None => println!("      Last error: (none)"),
    }
}

fn print_config(session: &Session) {
    let completion = session.client();
    let generation = completion.generation_config();
    println!("    Current Configuration:");
    println!("      Model: {}", completion.model());
    println!(
        "      Max tokens: {}",
        generation
            .max_output_tokens
            .map(|v| v.to_string())
            .unwrap_or_else(|| "default".to_string())
    );
    println!("      Temperature: {}", describe_float(generation.temperature));
    println!("      Top-p: {}", describe_float(generation.top_p));
    println!("      Top-k: {}", describe_top_k(generation.top_k));
    println!("      Page size: {}", session.stats().page_size);
    let setup = session.setup_prompt();
    println!(
        "      Setup prompt: {}",
        setup.lines().next().unwrap_or("(empty)")
    );
    print_stop_sequences(&generation.stop_sequences);
}

fn print_stop_sequences(stop_sequences: &[String]) {
    if stop_sequences.is_empty() {
        println!("      Stop sequences: (none)");
    } else {
        println!("      Stop sequences:");
        for seq in stop_sequences {
            println!("        - {}", seq);
        }
    }
}

fn describe_float(value: Option<f32>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "default".to_string())
}

fn describe_top_k(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "default".to_string())
}
