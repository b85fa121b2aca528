// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier selected by the `[notify]` config section

use crate::config::NotifyConfig;
use async_trait::async_trait;
use dw_adapters::{
    CommandNotifyAdapter, DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError,
};

#[derive(Clone, Debug)]
pub enum DaemonNotifier {
    None(NoOpNotifyAdapter),
    Desktop(DesktopNotifyAdapter),
    Command(CommandNotifyAdapter),
}

impl DaemonNotifier {
    pub fn from_config(config: &NotifyConfig) -> Self {
        match config {
            NotifyConfig::None => DaemonNotifier::None(NoOpNotifyAdapter::new()),
            NotifyConfig::Desktop => DaemonNotifier::Desktop(DesktopNotifyAdapter::new()),
            NotifyConfig::Command { program, args } => {
                DaemonNotifier::Command(CommandNotifyAdapter::new(program.clone(), args.clone()))
            }
        }
    }
}

#[async_trait]
impl NotifyAdapter for DaemonNotifier {
    fn connect(&self) -> bool {
        match self {
            DaemonNotifier::None(n) => n.connect(),
            DaemonNotifier::Desktop(n) => n.connect(),
            DaemonNotifier::Command(n) => n.connect(),
        }
    }

    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        match self {
            DaemonNotifier::None(n) => n.notify(title, message).await,
            DaemonNotifier::Desktop(n) => n.notify(title, message).await,
            DaemonNotifier::Command(n) => n.notify(title, message).await,
        }
    }
}
