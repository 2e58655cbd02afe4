//! Shared test utilities
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use linguovoice::voice::{
    AudioBackend, AudioBuffer, AudioContext, ContextState, OnEnded, PlaybackHandle, SpeechAudio,
};
use linguovoice::{Error, Result, SpeechSynthesizer, VoiceName};

/// Everything the mock audio backend observed
#[derive(Default)]
pub struct AudioLog {
    /// Sample rate of every context created
    pub contexts: Vec<u32>,
    pub resumes: usize,
    pub suspended: bool,
    pub starts: Vec<AudioBuffer>,
    pub stops: usize,
    pub playbacks: Vec<MockPlayback>,
}

/// Bookkeeping for one started playback
pub struct MockPlayback {
    pub active: bool,
    on_ended: Option<OnEnded>,
}

/// Audio backend that records calls instead of touching a device
#[derive(Clone, Default)]
pub struct MockAudio {
    log: Arc<Mutex<AudioLog>>,
}

impl MockAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boxed backend sharing this log
    pub fn backend(&self) -> Box<dyn AudioBackend> {
        Box::new(self.clone())
    }

    pub fn contexts(&self) -> Vec<u32> {
        self.log.lock().unwrap().contexts.clone()
    }

    pub fn resumes(&self) -> usize {
        self.log.lock().unwrap().resumes
    }

    pub fn starts(&self) -> usize {
        self.log.lock().unwrap().starts.len()
    }

    pub fn stops(&self) -> usize {
        self.log.lock().unwrap().stops
    }

    /// Samples of the nth started buffer
    pub fn started_samples(&self, n: usize) -> Vec<f32> {
        self.log.lock().unwrap().starts[n].samples.clone()
    }

    /// Number of playbacks currently active
    pub fn active(&self) -> usize {
        self.log.lock().unwrap().playbacks.iter().filter(|p| p.active).count()
    }

    /// Mark the context suspended, as after a device loss
    pub fn suspend(&self) {
        self.log.lock().unwrap().suspended = true;
    }

    /// Play the nth playback to its natural end
    ///
    /// The callback fires even if the playback was stopped, which models a
    /// completion event that raced with a stop.
    pub fn finish(&self, n: usize) {
        let callback = {
            let mut log = self.log.lock().unwrap();
            let playback = &mut log.playbacks[n];
            playback.active = false;
            playback.on_ended.take()
        };
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl AudioBackend for MockAudio {
    fn create_context(&self, sample_rate: u32) -> Result<Box<dyn AudioContext>> {
        self.log.lock().unwrap().contexts.push(sample_rate);
        Ok(Box::new(MockContext {
            log: Arc::clone(&self.log),
            sample_rate,
        }))
    }
}

struct MockContext {
    log: Arc<Mutex<AudioLog>>,
    sample_rate: u32,
}

impl AudioContext for MockContext {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn state(&self) -> ContextState {
        if self.log.lock().unwrap().suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        }
    }

    fn resume(&mut self) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.resumes += 1;
        log.suspended = false;
        Ok(())
    }

    fn start(&mut self, buffer: AudioBuffer, on_ended: OnEnded) -> Result<Box<dyn PlaybackHandle>> {
        let mut log = self.log.lock().unwrap();
        log.starts.push(buffer);
        log.playbacks.push(MockPlayback {
            active: true,
            on_ended: Some(on_ended),
        });
        Ok(Box::new(MockHandle {
            log: Arc::clone(&self.log),
            index: log.playbacks.len() - 1,
        }))
    }
}

struct MockHandle {
    log: Arc<Mutex<AudioLog>>,
    index: usize,
}

impl PlaybackHandle for MockHandle {
    fn stop(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.stops += 1;
        log.playbacks[self.index].active = false;
    }

    fn is_active(&self) -> bool {
        self.log.lock().unwrap().playbacks[self.index].active
    }
}

/// What a [`ScriptedSynthesizer`] answers with
#[derive(Clone)]
pub enum Script {
    /// Base64 payload
    Audio(String),
    /// Response without inline audio
    Nothing,
    /// Service failure
    Fail,
}

/// Speech synthesizer with a fixed answer
pub struct ScriptedSynthesizer {
    script: Script,
    pub calls: Mutex<Vec<(String, VoiceName)>>,
}

impl ScriptedSynthesizer {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, text: &str, voice: VoiceName) -> Result<Option<SpeechAudio>> {
        self.calls.lock().unwrap().push((text.to_string(), voice));
        match &self.script {
            Script::Audio(data) => Ok(Some(SpeechAudio::new(data.clone()))),
            Script::Nothing => Ok(None),
            Script::Fail => Err(Error::SpeechGeneration("service unavailable".to_string())),
        }
    }
}

/// Base64 of 100 ms of 24 kHz mono silence
pub fn silence_payload() -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(vec![0u8; 2400 * 2])
}

/// One request received by the mock Gemini server
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Last path segment, e.g. `gemini-3-flash-preview:generateContent`
    pub call: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    status: StatusCode,
    reply: Value,
}

/// Local stand-in for the Gemini API
pub struct MockGemini {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockGemini {
    /// Serve `reply` with `status` for every `generateContent` call
    pub async fn start(status: StatusCode, reply: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requests: Arc::clone(&requests),
            status,
            reply,
        };

        let app = Router::new()
            .route("/v1beta/models/{call}", post(generate_content))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// Reply with a single text candidate
    pub async fn text(text: &str) -> Self {
        Self::start(
            StatusCode::OK,
            json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] }),
        )
        .await
    }

    /// Reply with a single inline audio candidate
    pub async fn audio(data: &str) -> Self {
        Self::start(
            StatusCode::OK,
            json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": data } }]
                    }
                }]
            }),
        )
        .await
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn generate_content(
    State(state): State<MockState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state
        .requests
        .lock()
        .unwrap()
        .push(CapturedRequest { call, api_key, body });

    (state.status, Json(state.reply.clone()))
}
