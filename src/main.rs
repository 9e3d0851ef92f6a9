use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match quote_intake::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal: {e}");
            eprintln!("quote-intake: {e}");
            ExitCode::FAILURE
        }
    }
}
