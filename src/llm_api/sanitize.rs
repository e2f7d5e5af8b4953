use lazy_static::lazy_static;
use regex::Regex;

/// 清洗后仍然过短时返回的兜底回复
pub const FALLBACK_RESPONSE: &str =
    "I'm sorry, I couldn't process your request properly. Could you please try rephrasing your question?";

/// 上游在自然语言回答前拼接结构化数据（如搜索结果）所用的分隔标记
const ANSWER_MARKER: &str = "$~~~$";

/// 低于该字符数的回答视为退化结果
const MIN_ANSWER_CHARS: usize = 10;

lazy_static! {
    // 开头的数组状残片，如 "[{...}]"，非贪婪只剥一层
    static ref LEADING_BRACKET: Regex = Regex::new(r"^\[.*?\]").unwrap();
    // 步骤2之后可能暴露出的JSON残片，"{...}" 或 "[...]"
    static ref LEADING_JSON_FRAGMENT: Regex = Regex::new(r"^[{\[].*?[}\]]").unwrap();
}

/// 把上游返回的原始文本清洗为可展示的回答。
///
/// 上游的返回格式没有契约保证，这里是尽力而为的文本过滤而不是解析器：
/// 每一步对任意输入都安全通过，永不报错。步骤按顺序执行：
///
/// 1. 含有 `$~~~$` 标记时只保留最后一段（标记之前是附加的搜索结果等
///    结构化数据）；最后一段去空白后为空则保留原文。
/// 2. 剥掉一个开头的 `[...]` 残片。
/// 3. 删除所有残留的 `$~~~$` 标记。
/// 4. 剥掉一个开头的 `{...}` 或 `[...]` 残片。
/// 5. 去除首尾空白。
/// 6. 结果不足10个字符时整体替换为兜底回复。
pub fn sanitize_response(raw: &str) -> String {
    let mut answer = raw;
    if raw.contains(ANSWER_MARKER) {
        if let Some(last) = raw.split(ANSWER_MARKER).last() {
            let trimmed = last.trim();
            if !trimmed.is_empty() {
                answer = trimmed;
            }
        }
    }

    let cleaned = LEADING_BRACKET.replace(answer, "");
    let cleaned = cleaned.replace(ANSWER_MARKER, "");
    let cleaned = LEADING_JSON_FRAGMENT.replace(&cleaned, "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() < MIN_ANSWER_CHARS {
        FALLBACK_RESPONSE.to_string()
    } else {
        cleaned.to_string()
    }
}
