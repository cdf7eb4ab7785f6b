use anyhow::{Context, bail};
use glossa_types::{AppEvent, DictionaryId, GroupId, LinkTarget, TabId, UiEvent};
use kanal::AsyncSender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// Reads the terminal line by line. Plain lines are typed text; lines
/// starting with `:` are commands.
pub async fn watcher_io(
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::info!("Reading input from stdin");

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            tracing::info!("Input closed");
            event_tx.send(AppEvent::UiEvent(UiEvent::Close)).await?;
            break;
        };

        match parse_command(&line) {
            Ok(Some(event)) => event_tx.send(event).await?,
            Ok(None) => {}
            Err(e) => {
                tracing::debug!("Bad command '{}': {}", line, e);
                event_tx
                    .send(AppEvent::StatusUpdate(format!("{e:#}")))
                    .await?;
            }
        }
    }

    tracing::info!("Input watcher stopping");
    Ok(())
}

/// Turn one input line into an event. Match and history numbers are
/// 1-based as printed.
pub fn parse_command(line: &str) -> anyhow::Result<Option<AppEvent>> {
    let line = line.trim_end_matches(['\r', '\n']);

    let Some(command) = line.strip_prefix(':') else {
        return Ok(Some(AppEvent::TextInput(line.to_string())));
    };

    let (name, arg) = match command.trim().split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim(), ""),
    };

    let event = match name {
        "" => return Ok(None),
        "go" | "enter" => UiEvent::SubmitInput,
        "open" => UiEvent::ActivateMatch(position(arg)?),
        "link" => UiEvent::OpenLink {
            word: word(arg)?,
            target: LinkTarget::CurrentTab,
        },
        "tablink" => UiEvent::OpenLink {
            word: word(arg)?,
            target: LinkTarget::NewTab,
        },
        "define" => {
            let (group, rest) = arg
                .split_once(char::is_whitespace)
                .context("usage: :define <group|all> <word>")?;
            UiEvent::ShowDefinitionInNewTab {
                word: word(rest)?,
                group: group_arg(group)?,
            }
        }
        "back" => UiEvent::Back,
        "forward" => UiEvent::Forward,
        "new" => UiEvent::NewTab,
        "close" if arg.is_empty() => UiEvent::CloseCurrentTab,
        "close" => UiEvent::CloseTab(TabId(number(arg)?)),
        "tab" => UiEvent::SwitchTab(TabId(number(arg)?)),
        "next" => UiEvent::NextTab,
        "prev" => UiEvent::PreviousTab,
        "group" => UiEvent::SelectGroup(group_arg(arg)?),
        "mute" | "unmute" => UiEvent::MuteDictionary {
            dictionary: DictionaryId::new(word(arg)?),
            muted: name == "mute",
        },
        "bar" => UiEvent::ToggleDictionaryBar(match arg {
            "on" => true,
            "off" => false,
            _ => bail!("usage: :bar on|off"),
        }),
        "group-new" => {
            let mut parts = arg.split_whitespace();
            let name = parts.next().context("usage: :group-new <name> [dictionary...]")?;
            UiEvent::CreateGroup {
                name: name.to_string(),
                dictionaries: parts.map(DictionaryId::new).collect(),
            }
        }
        "group-rename" => {
            let (group, name) = arg
                .split_once(char::is_whitespace)
                .context("usage: :group-rename <group> <name>")?;
            UiEvent::RenameGroup {
                group: GroupId(number(group)?),
                name: word(name.trim())?,
            }
        }
        "group-set" => {
            let mut parts = arg.split_whitespace();
            let group = parts.next().context("usage: :group-set <group> [dictionary...]")?;
            UiEvent::SetGroupDictionaries {
                group: GroupId(number(group)?),
                dictionaries: parts.map(DictionaryId::new).collect(),
            }
        }
        "group-delete" => UiEvent::DeleteGroup(GroupId(number(arg)?)),
        "favorite" => {
            let (group, flag) = match arg.split_once(char::is_whitespace) {
                Some((group, flag)) => (group, flag.trim()),
                None => (arg, "on"),
            };
            UiEvent::SetFavorite {
                group: GroupId(number(group)?),
                favorite: match flag {
                    "on" => true,
                    "off" => false,
                    _ => bail!("usage: :favorite <group> [on|off]"),
                },
            }
        }
        "cancel" | "esc" => UiEvent::CancelSearch,
        "history" => UiEvent::OpenHistoryEntry(position(arg)?),
        "clear-history" => UiEvent::ClearHistory,
        "rescan" => UiEvent::RescanDictionaries,
        "quit" | "q" => UiEvent::Close,
        other => bail!("unknown command :{other}"),
    };

    Ok(Some(AppEvent::UiEvent(event)))
}

fn word(arg: &str) -> anyhow::Result<String> {
    if arg.is_empty() {
        bail!("a word is required");
    }
    Ok(arg.to_string())
}

fn number<T: std::str::FromStr>(arg: &str) -> anyhow::Result<T> {
    arg.parse()
        .map_err(|_| anyhow::anyhow!("expected a number, got '{arg}'"))
}

fn position(arg: &str) -> anyhow::Result<usize> {
    match number::<usize>(arg)? {
        0 => bail!("numbering starts at 1"),
        n => Ok(n - 1),
    }
}

fn group_arg(arg: &str) -> anyhow::Result<Option<GroupId>> {
    match arg {
        "all" | "none" => Ok(None),
        id => Ok(Some(GroupId(number(id)?))),
    }
}
