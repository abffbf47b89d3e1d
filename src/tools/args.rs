//! 工具参数读取：缺失或类型不对一律返回 InvalidArgs

use serde_json::Value;

use crate::tools::ToolError;

/// 必填字符串，去首尾空白后不能为空
pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidArgs(format!("missing required parameter: {key}")))
}

pub fn optional_str<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(|v| v.as_str()).map(str::trim).unwrap_or("")
}

/// 整数参数；也接受 "2" 这类字符串（语音转写常见）
pub fn int_arg(args: &Value, key: &str) -> Result<Option<i64>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
            .map(Some)
            .ok_or_else(|| ToolError::InvalidArgs(format!("parameter {key} must be an integer"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_arg_accepts_spoken_numbers() {
        let args = json!({"a": 2, "b": " 3 ", "c": "two", "d": null});
        assert_eq!(int_arg(&args, "a").unwrap(), Some(2));
        assert_eq!(int_arg(&args, "b").unwrap(), Some(3));
        assert!(matches!(int_arg(&args, "c"), Err(ToolError::InvalidArgs(_))));
        assert_eq!(int_arg(&args, "d").unwrap(), None);
        assert_eq!(int_arg(&args, "missing").unwrap(), None);
    }

    #[test]
    fn test_required_str_rejects_blank() {
        let args = json!({"name": "  ", "item": " Whopper "});
        assert!(required_str(&args, "name").is_err());
        assert_eq!(required_str(&args, "item").unwrap(), "Whopper");
    }
}
