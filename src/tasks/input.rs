use std::io::BufRead;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::events::UiCommand;

/// Stdin command reader. Stdin has no async story, so a blocking reader
/// thread bridges lines onto the command channel, the same way the frame
/// app bridges its filesystem-notification callbacks.
pub async fn run(cmd_tx: Sender<UiCommand>, cancel: CancellationToken) -> Result<()> {
    let reader = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(cmd) => {
                    if cmd_tx.blocking_send(cmd).is_err() {
                        break;
                    }
                }
                None => {
                    if !line.trim().is_empty() {
                        warn!(input = %line.trim(), "unrecognized command");
                    }
                }
            }
        }
    });

    select! {
        _ = cancel.cancelled() => {}
        _ = reader => {}
    }
    Ok(())
}

pub fn help() -> &'static str {
    "commands: n=next page  r=retry  o <idx>=open lightbox  c=close  \
     >=next image  <=previous image  .=swipe next  ,=swipe previous  \
     s <px>=scroll  w <w> <h>=resize  g=reload first page  q=quit"
}

fn parse_command(line: &str) -> Option<UiCommand> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let cmd = match head {
        "g" => UiCommand::LoadFirstPage,
        "n" => UiCommand::LoadNextPage,
        "r" => UiCommand::Retry,
        "o" => UiCommand::OpenLightbox(words.next()?.parse().ok()?),
        "c" => UiCommand::CloseLightbox,
        ">" => UiCommand::ShowNextImage,
        "<" => UiCommand::ShowPreviousImage,
        "." => UiCommand::SwipeNext,
        "," => UiCommand::SwipePrevious,
        "s" => UiCommand::ScrollTo(words.next()?.parse().ok()?),
        "w" => UiCommand::Resize {
            width: words.next()?.parse().ok()?,
            height: words.next()?.parse().ok()?,
        },
        "q" => UiCommand::Quit,
        _ => return None,
    };
    // Trailing junk invalidates the command.
    if words.next().is_some() {
        return None;
    }
    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_command("n"), Some(UiCommand::LoadNextPage));
        assert_eq!(parse_command("q"), Some(UiCommand::Quit));
        assert_eq!(parse_command("o 4"), Some(UiCommand::OpenLightbox(4)));
        assert_eq!(
            parse_command(" w 480 800 "),
            Some(UiCommand::Resize {
                width: 480,
                height: 800
            })
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("o"), None);
        assert_eq!(parse_command("o x"), None);
        assert_eq!(parse_command("n 3"), None);
        assert_eq!(parse_command("zz"), None);
    }
}
