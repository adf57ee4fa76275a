use std::path::PathBuf;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use regex::Regex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{BrowserInstance, BrowserLauncher};
use crate::error::BrowserError;

/// 从 DevTools websocket 地址中提取端口
///
/// `ws://127.0.0.1:9222/devtools/browser/<id>` → `9222`
pub fn parse_debug_port(address: &str) -> Result<u16, BrowserError> {
    let unavailable = || BrowserError::PortUnavailable {
        address: address.to_string(),
    };
    let re = Regex::new(r"^wss?://[^/]+:(\d+)(/|$)").map_err(|_| unavailable())?;

    re.captures(address)
        .and_then(|caps| caps.get(1))
        .and_then(|port| port.as_str().parse().ok())
        .ok_or_else(unavailable)
}

/// 基于 chromiumoxide 的无头浏览器启动器
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    chrome_executable: Option<PathBuf>,
}

impl ChromeLauncher {
    pub fn new(chrome_executable: Option<PathBuf>) -> Self {
        Self { chrome_executable }
    }
}

impl BrowserLauncher for ChromeLauncher {
    type Instance = ChromeInstance;

    async fn launch(&self, flags: &[String]) -> Result<ChromeInstance, BrowserError> {
        info!("🚀 启动无头浏览器...");
        debug!("浏览器参数: {:?}", flags);

        let mut builder = BrowserConfig::builder()
            .new_headless_mode()
            .args(flags.iter().map(String::as_str));
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            BrowserError::launch_failed(e)
        })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            BrowserError::launch_failed(e)
        })?;

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let port = match parse_debug_port(browser.websocket_address()) {
            Ok(port) => port,
            Err(e) => {
                let mut instance = ChromeInstance {
                    browser,
                    handler_task,
                    port: 0,
                };
                instance.shutdown().await;
                return Err(e);
            }
        };

        info!("✅ 浏览器已启动, 调试端口: {}", port);
        Ok(ChromeInstance {
            browser,
            handler_task,
            port,
        })
    }
}

/// 已启动的 Chrome 进程
pub struct ChromeInstance {
    browser: Browser,
    handler_task: JoinHandle<()>,
    port: u16,
}

impl ChromeInstance {
    /// 尽力关闭，用于启动过程中的清理
    async fn shutdown(&mut self) {
        if let Err(e) = self.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        let closed = self.browser.close().await;
        let result = match closed {
            Ok(_) => self
                .browser
                .wait()
                .await
                .map(|_| ())
                .map_err(|e| BrowserError::KillFailed {
                    reason: e.to_string(),
                }),
            Err(e) => {
                warn!("正常关闭浏览器失败, 强制结束进程: {}", e);
                match self.browser.kill().await {
                    Some(Err(e)) => Err(BrowserError::KillFailed {
                        reason: e.to_string(),
                    }),
                    _ => Ok(()),
                }
            }
        };
        self.handler_task.abort();
        result
    }
}

impl BrowserInstance for ChromeInstance {
    fn port(&self) -> u16 {
        self.port
    }

    async fn kill(mut self) -> Result<(), BrowserError> {
        debug!("关闭浏览器 (端口: {})", self.port);
        self.close().await?;
        info!("🛑 浏览器已关闭");
        Ok(())
    }
}
