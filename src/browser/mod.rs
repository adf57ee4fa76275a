//! 浏览器控制
//!
//! 一次审计独占一个浏览器实例，`kill` 消费实例本身，保证只释放一次

pub mod headless;

use std::future::Future;

use crate::error::BrowserError;

pub use headless::{parse_debug_port, ChromeInstance, ChromeLauncher};

/// 已启动的浏览器实例
pub trait BrowserInstance: Send {
    /// 远程调试端口
    fn port(&self) -> u16;

    /// 关闭浏览器进程
    fn kill(self) -> impl Future<Output = Result<(), BrowserError>> + Send;
}

/// 浏览器启动器
pub trait BrowserLauncher: Send + Sync {
    type Instance: BrowserInstance;

    /// 使用给定参数启动浏览器，调试端口由浏览器自行分配
    fn launch(
        &self,
        flags: &[String],
    ) -> impl Future<Output = Result<Self::Instance, BrowserError>> + Send;
}
