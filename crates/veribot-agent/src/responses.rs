//! Canned reply tables and greeting/farewell detection.
//!
//! Plain static data; the reply for a turn is picked at random from the
//! matching table.

use rand::seq::SliceRandom;

pub const GREETING_REPLIES: &[&str] = &[
    "你好！我是唯理书院智能助手。有什么可以帮助你的吗？",
    "欢迎来到唯理书院！我可以回答关于暑期项目的任何问题。",
    "你好！我是书院的AI助手，有什么想了解的吗？",
];

pub const FAREWELL_REPLIES: &[&str] = &[
    "感谢使用唯理书院智能助手。祝你度过美好的一天！",
    "再见！如果还有问题随时可以来询问。",
    "回头见！有任何疑问都可以再来找我。",
];

pub const UNKNOWN_REPLIES: &[&str] = &[
    "抱歉，我还不太确定这个问题。你可以换个方式问问吗？",
    "我暂时没有这方面的信息。你可以询问关于课程安排、地点或住宿等问题。",
    "我还在学习这个话题。有其他我可以帮助你的吗？",
];

const GREETING_WORDS: &[&str] = &[
    "hello", "hi", "hey", "good morning", "good afternoon", "good evening",
    "你好", "您好", "嗨", "早上好", "下午好", "晚上好", "晚安",
];

const FAREWELL_WORDS: &[&str] = &[
    "goodbye", "bye", "see you", "thank you", "thanks",
    "再见", "拜拜", "谢谢", "感谢", "回头见", "下次见",
];

pub fn is_greeting(text: &str) -> bool {
    let text = text.to_lowercase();
    GREETING_WORDS.iter().any(|w| text.contains(w))
}

pub fn is_farewell(text: &str) -> bool {
    let text = text.to_lowercase();
    FAREWELL_WORDS.iter().any(|w| text.contains(w))
}

/// Pick one reply from a table.
pub fn pick(replies: &'static [&'static str]) -> &'static str {
    replies
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("")
}
