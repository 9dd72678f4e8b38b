use chatai_client::terminal::HELP;
use chatai_client::{ClientConfig, Command, LineRecognizer, PrintSynthesizer, render_event};
use chatai_conversation::{
    CaptureState, HttpRelayTransport, SessionController, SessionEvent, SessionState,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env().expect("failed to load configuration");

    let transport = match config.timeout() {
        Some(timeout) => HttpRelayTransport::with_timeout(config.relay_url.clone(), timeout),
        None => HttpRelayTransport::new(config.relay_url.clone()),
    }
    .expect("failed to create relay transport");

    let mut session = SessionController::builder(Arc::new(transport))
        .recognizer(LineRecognizer)
        .synthesizer(PrintSynthesizer::new(std::io::stdout()))
        .resubmit_policy(config.resubmit)
        .paused(config.start_paused)
        .build();
    let mut events = session.subscribe();

    tracing::info!(session_id = %session.id(), relay = %config.relay_url, "Session started");
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut segments: Vec<String> = Vec::new();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin");
                break;
            }
        };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::History => {
                for message in session.conversation() {
                    println!("{}> {}", message.role(), message.content());
                }
            }
            Command::Pause => {
                session.toggle_pause();
            }
            Command::Dictate => {
                let stopping = session.capture_state() == CaptureState::Listening;
                match session.toggle_capture() {
                    Ok(()) if stopping => finish_dictation(&mut session, &mut segments).await,
                    Ok(()) => segments.clear(),
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            Command::EndOfSpeech => {
                if session.capture_state() != CaptureState::Inactive {
                    finish_dictation(&mut session, &mut segments).await;
                }
            }
            Command::Text(text) if session.capture_state() != CaptureState::Inactive => {
                if !segments.is_empty() {
                    segments.push(" ".to_string());
                }
                segments.push(text);
                session.on_recognition_result(&segments);
            }
            Command::Text(text) => {
                if let Err(e) = session.submit(&text).await {
                    eprintln!("error: {e}");
                }
            }
        }

        // Printed speech finishes immediately.
        if session.state() == SessionState::Speaking
            && let Some(utterance) = session.queued_utterance().cloned()
        {
            session.on_utterance_end(&utterance);
        }
        print_events(&mut events);
    }

    tracing::info!(
        session_id = %session.id(),
        messages = session.conversation().len(),
        "Session ended"
    );
}

async fn finish_dictation(session: &mut SessionController, segments: &mut Vec<String>) {
    segments.clear();
    if let Err(e) = session.handle_recognition_end().await {
        eprintln!("error: {e}");
    }
}

fn print_events(events: &mut broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        if let Some(line) = render_event(&event) {
            println!("{line}");
        }
    }
}
