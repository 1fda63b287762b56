use std::time::Duration;

use clap::Subcommand;
use dashpanel_core::broadcasts::panel::PANEL_ID;
use dashpanel_core::broadcasts::{
    render, BroadcastPoller, BroadcastState, BroadcastsView, PanelBody, PanelState, SidebarProps,
};
use dashpanel_core::{ApiClient, BroadcastApi, Config};
use tokio::sync::watch;

use super::{api_client, CmdResult};

#[derive(Subcommand)]
pub enum BroadcastsAction {
    /// Fetch and print recent updates once
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep polling and print the panel whenever it changes
    Watch {
        /// Open the panel; unseen updates are marked seen after the dwell
        #[arg(long)]
        open: bool,
        /// Stop after the first load (and the dwell, with --open)
        #[arg(long)]
        once: bool,
    },
    /// Mark every unseen update as seen
    MarkSeen,
}

pub async fn run(action: BroadcastsAction) -> CmdResult {
    let config = Config::load()?;
    let api = api_client(&config)?;

    match action {
        BroadcastsAction::List { json } => {
            let broadcasts = api.fetch_broadcasts().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&broadcasts)?);
                return Ok(());
            }
            let state = BroadcastState {
                broadcasts,
                loading: false,
                ..BroadcastState::default()
            };
            print_view(&render(&state, &shown_panel()));
        }
        BroadcastsAction::Watch { open, once } => watch(api, &config, open, once).await?,
        BroadcastsAction::MarkSeen => {
            let poller = BroadcastPoller::start(api, config.poller_settings());
            let state = wait_loaded(&mut poller.subscribe()).await?;
            if state.error {
                return Err("could not fetch broadcasts".into());
            }
            let sent = poller.mark_seen().await?;
            if sent == 0 {
                println!("nothing to mark");
            } else {
                println!("marked {sent} update(s) as seen");
            }
            poller.shutdown();
        }
    }
    Ok(())
}

async fn watch(api: ApiClient, config: &Config, open: bool, once: bool) -> CmdResult {
    let mut poller = BroadcastPoller::start(api, config.poller_settings());
    let mut rx = poller.subscribe();
    let props = if open {
        shown_panel()
    } else {
        SidebarProps::default()
    };

    let first = wait_loaded(&mut rx).await?;
    print_view(&render(&first, &props));
    if open {
        poller.on_open();
    }

    if once {
        if open {
            let dwell = config.poller_settings().dwell;
            // The dwell sends at most one request; give it the API timeout on top.
            let limit = dwell + Duration::from_secs(config.api.timeout_secs);
            let seen = tokio::time::timeout(limit, rx.wait_for(|s| s.panel == PanelState::OpenSeen))
                .await
                .ok()
                .and_then(|r| r.ok().map(|state| state.clone()));
            match seen {
                Some(state) => print_view(&render(&state, &props)),
                None => tracing::warn!("panel was not acknowledged before the timeout"),
            }
        }
        poller.shutdown();
        return Ok(());
    }

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                print_view(&render(&state, &props));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    poller.on_close();
    poller.shutdown();
    Ok(())
}

async fn wait_loaded(
    rx: &mut watch::Receiver<BroadcastState>,
) -> Result<BroadcastState, Box<dyn std::error::Error>> {
    let state = rx.wait_for(|s| !s.loading).await?;
    Ok(state.clone())
}

fn shown_panel() -> SidebarProps<'static> {
    SidebarProps {
        current_panel: Some(PANEL_ID),
        show_panel: true,
    }
}

fn print_view(view: &BroadcastsView) {
    let badge = match view.toggle.unseen_count {
        0 => String::new(),
        n => format!(" ({n} new)"),
    };
    let Some(panel) = &view.panel else {
        println!("updates{badge}");
        return;
    };

    println!("{}{badge}", panel.title);
    match &panel.body {
        PanelBody::Loading => println!("  loading..."),
        PanelBody::Empty(message) => println!("  {message}"),
        PanelBody::Items(items) => {
            for item in items {
                let marker = if item.unseen { "*" } else { " " };
                println!("{marker} {}", item.title);
                if !item.message.is_empty() {
                    println!("    {}", item.message);
                }
                if let Some(link) = &item.link {
                    println!("    {link}");
                }
            }
        }
    }
}
