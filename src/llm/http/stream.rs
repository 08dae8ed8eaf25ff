use std::collections::VecDeque;
use std::future::Future;

use futures::StreamExt;
use serde_json::Value;

use crate::error::{Result, SwarmError};
use crate::llm::types::LlmStream;

#[derive(Clone, Debug, PartialEq)]
pub struct LlmStreamChunk {
    pub content: String,
    pub done: bool,
}

impl LlmStreamChunk {
    fn text(content: String) -> Self {
        Self {
            content,
            done: false,
        }
    }

    fn done() -> Self {
        Self {
            content: String::new(),
            done: true,
        }
    }
}

/// 把网络字节块增量解析为文本分片
pub trait ChunkParser: Send {
    fn feed(&mut self, data: &[u8]) -> Result<Vec<LlmStreamChunk>>;
}

/// SSE (Server-Sent Events) 解析器
///
/// 同时支持 OpenAI（`choices[0].delta.content`，以 `[DONE]` 结束）
/// 和 Anthropic（`content_block_delta` / `message_stop`）两种事件格式。
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// 解析数据块，返回流式 chunk 列表
    ///
    /// SSE 格式：
    /// ```text
    /// event: content_block_delta
    /// data: {"type":"content_block_delta","delta":{"type":"text_delta","text":"Hello"}}
    ///
    /// data: [DONE]
    /// ```
    pub fn parse_chunk(&mut self, data: &[u8]) -> Result<Vec<LlmStreamChunk>> {
        // 只解码完整事件，跨读取边界的多字节字符留在缓冲区
        self.buffer
            .extend(data.iter().copied().filter(|&byte| byte != b'\r'));

        let mut chunks = Vec::new();
        while let Some(end) = find_bytes(&self.buffer, b"\n\n") {
            let event: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(chunk) = Self::parse_event(&String::from_utf8_lossy(&event[..end]))? {
                chunks.push(chunk);
            }
        }

        Ok(chunks)
    }

    /// 解析单个 SSE 事件；`event:` 行被忽略，类型以 JSON 里的 `type` 为准
    fn parse_event(event_text: &str) -> Result<Option<LlmStreamChunk>> {
        let data: String = event_text
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(str::trim_start)
            .collect::<Vec<_>>()
            .join("\n");

        if data.trim().is_empty() {
            return Ok(None);
        }
        if data.trim() == "[DONE]" {
            return Ok(Some(LlmStreamChunk::done()));
        }

        let json: Value = serde_json::from_str(&data).map_err(|e| {
            SwarmError::Provider(format!("failed to parse SSE JSON: {}: {}", e, data))
        })?;

        match json["type"].as_str() {
            Some("message_stop") => return Ok(Some(LlmStreamChunk::done())),
            Some("error") => {
                let message = json["error"]["message"]
                    .as_str()
                    .unwrap_or("stream error")
                    .to_string();
                return Err(SwarmError::Provider(message));
            }
            _ => {}
        }

        let content = Self::extract_content_delta(&json);
        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(LlmStreamChunk::text(content)))
        }
    }

    fn extract_content_delta(json: &Value) -> String {
        if let Some(content) = json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice["delta"]["content"].as_str())
        {
            return content.to_string();
        }

        if json["type"] == "content_block_delta" && json["delta"]["type"] == "text_delta" {
            if let Some(text) = json["delta"]["text"].as_str() {
                return text.to_string();
            }
        }

        String::new()
    }
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkParser for SseParser {
    fn feed(&mut self, data: &[u8]) -> Result<Vec<LlmStreamChunk>> {
        self.parse_chunk(data)
    }
}

/// Ollama 的逐行 JSON 流
#[derive(Default)]
pub struct NdjsonParser {
    buffer: Vec<u8>,
}

impl NdjsonParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChunkParser for NdjsonParser {
    fn feed(&mut self, data: &[u8]) -> Result<Vec<LlmStreamChunk>> {
        self.buffer.extend_from_slice(data);

        let mut chunks = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&byte| byte == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let json: Value = serde_json::from_str(line).map_err(|e| {
                SwarmError::Provider(format!("failed to parse stream line: {}: {}", e, line))
            })?;
            if let Some(error) = json["error"].as_str() {
                return Err(SwarmError::Provider(error.to_string()));
            }
            if let Some(content) = json["message"]["content"].as_str() {
                if !content.is_empty() {
                    chunks.push(LlmStreamChunk::text(content.to_string()));
                }
            }
            if json["done"].as_bool().unwrap_or(false) {
                chunks.push(LlmStreamChunk::done());
            }
        }
        Ok(chunks)
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// 把 HTTP 响应体转换为文本分片流
pub(crate) fn response_stream<P>(response: reqwest::Response, parser: P) -> LlmStream
where
    P: ChunkParser + 'static,
{
    let bytes = Box::pin(response.bytes_stream());

    Box::pin(futures::stream::unfold(
        (bytes, parser, VecDeque::<String>::new(), false),
        |(mut bytes, mut parser, mut pending, mut finished)| async move {
            loop {
                if let Some(text) = pending.pop_front() {
                    return Some((Ok(text), (bytes, parser, pending, finished)));
                }
                if finished {
                    return None;
                }
                match bytes.next().await {
                    Some(Ok(data)) => match parser.feed(&data) {
                        Ok(chunks) => {
                            for chunk in chunks {
                                if chunk.done {
                                    finished = true;
                                    break;
                                }
                                pending.push_back(chunk.content);
                            }
                        }
                        Err(err) => {
                            finished = true;
                            return Some((Err(err), (bytes, parser, pending, finished)));
                        }
                    },
                    Some(Err(err)) => {
                        finished = true;
                        return Some((Err(err.into()), (bytes, parser, pending, finished)));
                    }
                    None => finished = true,
                }
            }
        },
    ))
}

/// 延迟到首次拉取时才发起请求
pub(crate) fn deferred<F>(open: F) -> LlmStream
where
    F: Future<Output = Result<LlmStream>> + Send + 'static,
{
    Box::pin(futures::stream::once(open).flat_map(|opened| match opened {
        Ok(stream) => stream,
        Err(err) => Box::pin(futures::stream::iter(vec![Err(err)])) as LlmStream,
    }))
}
