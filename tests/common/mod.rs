//! Scripted native layers shared by the integration tests.

#![allow(dead_code)]

use mobiledevice::bridge::{
    CurrentList, OpaqueContext, RequestCallback, StatusErrorFields, StatusReport,
};
use mobiledevice::codec::Node;
use mobiledevice::device::{EventDispatcher, NativeDeviceEvents, RawDeviceEvent};
use mobiledevice::instproxy::NativeInstallationProxy;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One status report as the native layer would deliver it.
#[derive(Debug, Clone, Default)]
pub struct Status {
    pub error: StatusErrorFields,
    pub name: Option<String>,
    pub percent: i32,
    pub list: CurrentList,
}

impl Status {
    pub fn phase(name: &str, percent: i32) -> Self {
        Self {
            name: Some(name.to_string()),
            percent,
            ..Default::default()
        }
    }

    pub fn failure(code: i32, name: &str, description: &str) -> Self {
        Self {
            error: StatusErrorFields {
                code,
                name: Some(name.to_string()),
                description: Some(description.to_string()),
                detail_code: 0xe800_0032,
            },
            ..Default::default()
        }
    }

    pub fn page(name: &str, index: u64, total: u64, items: Node) -> Self {
        let amount = items.as_array().map_or(0, |a| a.len() as u64);
        Self {
            name: Some(name.to_string()),
            percent: -1,
            list: CurrentList {
                total,
                current_index: index,
                current_amount: amount,
                list: Some(items),
            },
            ..Default::default()
        }
    }
}

impl StatusReport for Status {
    fn error(&self) -> StatusErrorFields {
        self.error.clone()
    }
    fn name(&self) -> Option<String> {
        self.name.clone()
    }
    fn percent_complete(&self) -> i32 {
        self.percent
    }
    fn current_list(&self) -> CurrentList {
        self.list.clone()
    }
}

/// Installation proxy that replays a script on a native-owned thread.
#[derive(Default)]
pub struct ScriptedProxy {
    /// Return code of every request function; non-zero refuses the request.
    pub code: i32,
    pub script: Vec<Status>,
    /// Pause between reports.
    pub pace: Option<Duration>,
    pub calls: AtomicUsize,
    pub verbs: Mutex<Vec<&'static str>>,
    pub last_options: Mutex<Option<Node>>,
}

impl ScriptedProxy {
    pub fn new(script: Vec<Status>) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    pub fn refusing(code: i32) -> Self {
        Self {
            code,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn run(
        &self,
        verb: &'static str,
        options: Option<&Node>,
        callback: RequestCallback,
        context: OpaqueContext,
    ) -> i32 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verbs.lock().unwrap().push(verb);
        *self.last_options.lock().unwrap() = options.cloned();
        if self.code != 0 {
            return self.code;
        }

        let script = self.script.clone();
        let pace = self.pace;
        thread::spawn(move || {
            for status in &script {
                if let Some(pace) = pace {
                    thread::sleep(pace);
                }
                callback(status, context);
            }
        });
        0
    }
}

impl NativeInstallationProxy for ScriptedProxy {
    fn install(&self, _: &Path, options: &Node, cb: RequestCallback, ctx: OpaqueContext) -> i32 {
        self.run("install", Some(options), cb, ctx)
    }
    fn upgrade(&self, _: &Path, options: &Node, cb: RequestCallback, ctx: OpaqueContext) -> i32 {
        self.run("upgrade", Some(options), cb, ctx)
    }
    fn uninstall(&self, _: &str, options: &Node, cb: RequestCallback, ctx: OpaqueContext) -> i32 {
        self.run("uninstall", Some(options), cb, ctx)
    }
    fn archive(&self, _: &str, options: &Node, cb: RequestCallback, ctx: OpaqueContext) -> i32 {
        self.run("archive", Some(options), cb, ctx)
    }
    fn restore(&self, _: &str, options: &Node, cb: RequestCallback, ctx: OpaqueContext) -> i32 {
        self.run("restore", Some(options), cb, ctx)
    }
    fn remove_archive(
        &self,
        _: &str,
        options: Option<&Node>,
        cb: RequestCallback,
        ctx: OpaqueContext,
    ) -> i32 {
        self.run("remove_archive", options, cb, ctx)
    }
    fn browse(&self, options: &Node, cb: RequestCallback, ctx: OpaqueContext) -> i32 {
        self.run("browse", Some(options), cb, ctx)
    }
    fn lookup(&self, _: &[String], _: &Node) -> Result<Option<Node>, i32> {
        Err(self.code)
    }
    fn lookup_archives(&self, _: Option<&Node>) -> Result<Option<Node>, i32> {
        Err(self.code)
    }
    fn path_for_bundle_identifier(&self, _: &str) -> Result<Option<String>, i32> {
        Err(self.code)
    }
}

/// Device event source whose events are pushed from a dedicated thread.
#[derive(Default)]
pub struct EventSource {
    dispatcher: Mutex<Option<EventDispatcher>>,
    pub subscribes: AtomicUsize,
    pub unsubscribes: AtomicUsize,
    pub devices: Vec<String>,
}

impl EventSource {
    pub fn with_devices(devices: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            devices: devices.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        })
    }

    /// Deliver `events` on a native thread and wait for it to finish.
    pub fn emit(&self, events: Vec<RawDeviceEvent>) {
        let dispatcher = self.dispatcher.lock().unwrap().clone();
        thread::spawn(move || {
            if let Some(dispatcher) = dispatcher {
                for event in &events {
                    dispatcher(event);
                }
            }
        })
        .join()
        .unwrap();
    }

    pub fn subscribes(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn unsubscribes(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }
}

impl NativeDeviceEvents for EventSource {
    fn subscribe(&self, dispatcher: EventDispatcher) -> i32 {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        *self.dispatcher.lock().unwrap() = Some(dispatcher);
        0
    }

    fn unsubscribe(&self) -> i32 {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        *self.dispatcher.lock().unwrap() = None;
        0
    }

    fn device_list(&self) -> Result<Vec<String>, i32> {
        if self.devices.is_empty() {
            return Err(-3);
        }
        Ok(self.devices.clone())
    }
}
