#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::web;
use chrono::NaiveDate;
use fir_generator_server::fir::{
    FirState, FixedClock, MarkupDocument, PageConfig, RenderEngine, RenderError, RenderPool,
    RenderSession,
};
use serde_json::{json, Value};

pub const FAKE_PDF: &[u8] = b"%PDF-1.7\n%fake\n";

/// A record that passes validation, with one charge and no accused.
pub fn valid_record() -> Value {
    json!({
        "caseNumber": "2024-0042",
        "policeStation": "Cubbon Park",
        "district": "Bengaluru Urban",
        "complainant": {
            "name": "Ramesh Kumar",
            "fatherName": "Suresh Kumar",
            "age": 34,
            "address": "12 MG Road, Bengaluru",
            "phone": "9876543210"
        },
        "incident": {
            "date": "2024-03-15",
            "time": "21:30",
            "place": "City Bus Stand",
            "description": "The complainant's mobile phone was snatched."
        },
        "accused": { "name": "", "age": "", "address": "" },
        "charges": [
            { "section": "303", "description": "Theft", "type": "BNS" }
        ]
    })
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2024, 3, 16).unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Succeed,
    FailLaunch,
    FailPrint,
    Hang,
}

/// Shared counters observed by the tests.
#[derive(Default)]
pub struct Counters {
    pub launched: AtomicUsize,
    pub released: AtomicUsize,
    pub markups: Mutex<Vec<String>>,
}

impl Counters {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn last_markup(&self) -> Option<String> {
        self.markups.lock().unwrap().last().cloned()
    }
}

/// Render engine double that counts sessions and can be told to fail.
pub struct CountingEngine {
    pub counters: Arc<Counters>,
    behaviour: Behaviour,
}

impl CountingEngine {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            behaviour,
        }
    }
}

struct CountingSession {
    counters: Arc<Counters>,
    behaviour: Behaviour,
}

#[async_trait::async_trait]
impl RenderEngine for CountingEngine {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        if self.behaviour == Behaviour::FailLaunch {
            return Err(RenderError::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "typst not installed",
            )));
        }
        self.counters.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingSession {
            counters: self.counters.clone(),
            behaviour: self.behaviour,
        }))
    }
}

#[async_trait::async_trait]
impl RenderSession for CountingSession {
    async fn load(&mut self, markup: &MarkupDocument) -> Result<(), RenderError> {
        self.counters
            .markups
            .lock()
            .unwrap()
            .push(markup.as_str().to_string());
        Ok(())
    }

    async fn print(&mut self, _page: &PageConfig) -> Result<Vec<u8>, RenderError> {
        match self.behaviour {
            Behaviour::FailPrint => Err(RenderError::Exit {
                code: 1,
                stderr: "error: unknown variable: details-table".to_string(),
            }),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(FAKE_PDF.to_vec())
            }
            _ => Ok(FAKE_PDF.to_vec()),
        }
    }
}

impl Drop for CountingSession {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// FIR state wired to a counting engine and a fixed clock.
pub fn test_state(behaviour: Behaviour, capacity: usize) -> (web::Data<FirState>, Arc<Counters>) {
    test_state_with_timeout(behaviour, capacity, Duration::from_secs(5))
}

pub fn test_state_with_timeout(
    behaviour: Behaviour,
    capacity: usize,
    timeout: Duration,
) -> (web::Data<FirState>, Arc<Counters>) {
    let engine = CountingEngine::new(behaviour);
    let counters = engine.counters.clone();
    let pool = RenderPool::new(Arc::new(engine), capacity, timeout);
    let state = FirState::new(pool).with_clock(Arc::new(fixed_clock()));
    (web::Data::new(state), counters)
}
