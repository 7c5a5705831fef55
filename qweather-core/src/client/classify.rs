use serde_json::Value;

/// Failure codes the provider reports, either as an HTTP status or in the legacy
/// (v1) in-body `code` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCode {
    NoData,
    BadRequest,
    Unauthorized,
    QuotaExhausted,
    Forbidden,
    NotFound,
    TooManyRequests,
    ServerError,
    Other(String),
}

impl ProviderCode {
    pub fn from_body_code(code: &str) -> Self {
        match code {
            "204" => ProviderCode::NoData,
            "400" => ProviderCode::BadRequest,
            "401" => ProviderCode::Unauthorized,
            "402" => ProviderCode::QuotaExhausted,
            "403" => ProviderCode::Forbidden,
            "404" => ProviderCode::NotFound,
            "429" => ProviderCode::TooManyRequests,
            "500" => ProviderCode::ServerError,
            other => ProviderCode::Other(other.to_string()),
        }
    }

    /// Only the statuses the provider documents; everything else is `Other`.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => ProviderCode::BadRequest,
            401 => ProviderCode::Unauthorized,
            403 => ProviderCode::Forbidden,
            404 => ProviderCode::NotFound,
            429 => ProviderCode::TooManyRequests,
            500 => ProviderCode::ServerError,
            other => ProviderCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProviderCode::NoData => "204",
            ProviderCode::BadRequest => "400",
            ProviderCode::Unauthorized => "401",
            ProviderCode::QuotaExhausted => "402",
            ProviderCode::Forbidden => "403",
            ProviderCode::NotFound => "404",
            ProviderCode::TooManyRequests => "429",
            ProviderCode::ServerError => "500",
            ProviderCode::Other(code) => code,
        }
    }

    /// Diagnostic text in the provider's language followed by an English gloss.
    pub fn explanation(&self) -> &'static str {
        match self {
            ProviderCode::NoData => {
                "请求成功，但你查询的地区暂时没有你需要的数据。 (request succeeded, but the queried region has no data for this endpoint)"
            }
            ProviderCode::BadRequest => {
                "请求错误，可能包含错误的请求参数或缺少必选的请求参数。 (bad request: invalid or missing parameters)"
            }
            ProviderCode::Unauthorized => {
                "认证失败，可能使用了错误的KEY、数字签名错误、KEY的类型错误（如使用SDK的KEY去访问Web API）。 (authentication failed: wrong key, bad signature or wrong key type)"
            }
            ProviderCode::QuotaExhausted => {
                "超过访问次数或余额不足以支持继续访问服务，你可以充值、升级访问量或等待访问量重置。 (quota exceeded or balance exhausted; top up, upgrade or wait for the daily reset)"
            }
            ProviderCode::Forbidden => {
                "无访问权限，可能是绑定的PackageName、BundleID、域名IP地址不一致，或者是需要额外付费的数据。 (access denied: bound package, bundle id or domain mismatch, or paid data)"
            }
            ProviderCode::NotFound => "查询的数据或地区不存在。 (requested data or region does not exist)",
            ProviderCode::TooManyRequests => {
                "超过限定的QPM（每分钟访问次数）。 (requests-per-minute limit exceeded)"
            }
            ProviderCode::ServerError => "无响应或超时，接口服务异常。 (no response or timeout, provider service error)",
            ProviderCode::Other(_) => "未知错误。 (unknown error)",
        }
    }
}

impl std::fmt::Display for ProviderCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_str(), self.explanation())
    }
}

/// Outcome of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedResponse {
    Success(Value),
    /// 200 with nothing usable in the body.
    Empty,
    /// Not retried until restart.
    ClientError { code: ProviderCode, detail: Option<String> },
    /// Retried after the transient cooldown.
    TransientError { code: ProviderCode },
    /// In-body 402: daily quota gone until the provider resets it.
    QuotaExhausted,
    Unknown { code: String },
}

impl ClassifiedResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ClassifiedResponse::Success(_))
    }
}

/// Classify an HTTP status and raw body.
///
/// A 200 whose body is blank, unparsable, not an object or an empty object is `Empty`.
/// A 200 carrying a `code` other than `"200"` is classified by that code instead.
/// Bodies without a `code` field (the newer air-quality API) count as success.
pub fn classify(status: u16, body: &[u8]) -> ClassifiedResponse {
    if status != 200 {
        return classify_status(status, body);
    }

    let Ok(json) = serde_json::from_slice::<Value>(body) else {
        return ClassifiedResponse::Empty;
    };

    match json.as_object() {
        Some(object) if !object.is_empty() => {}
        _ => return ClassifiedResponse::Empty,
    }

    match body_code(&json) {
        None => ClassifiedResponse::Success(json),
        Some(code) if code == "200" => ClassifiedResponse::Success(json),
        Some(code) => classify_body_code(&code),
    }
}

fn classify_status(status: u16, body: &[u8]) -> ClassifiedResponse {
    match ProviderCode::from_http_status(status) {
        ProviderCode::BadRequest => ClassifiedResponse::ClientError {
            code: ProviderCode::BadRequest,
            detail: error_detail(body),
        },
        code @ (ProviderCode::Unauthorized | ProviderCode::Forbidden | ProviderCode::NotFound) => {
            ClassifiedResponse::ClientError { code, detail: None }
        }
        code @ (ProviderCode::TooManyRequests | ProviderCode::ServerError) => {
            ClassifiedResponse::TransientError { code }
        }
        _ => ClassifiedResponse::Unknown { code: status.to_string() },
    }
}

/// Legacy v1 in-body error codes.
pub fn classify_body_code(code: &str) -> ClassifiedResponse {
    match ProviderCode::from_body_code(code) {
        code @ (ProviderCode::NoData
        | ProviderCode::BadRequest
        | ProviderCode::Unauthorized
        | ProviderCode::Forbidden
        | ProviderCode::NotFound) => ClassifiedResponse::ClientError { code, detail: None },
        ProviderCode::QuotaExhausted => ClassifiedResponse::QuotaExhausted,
        code @ (ProviderCode::TooManyRequests | ProviderCode::ServerError) => {
            ClassifiedResponse::TransientError { code }
        }
        ProviderCode::Other(code) => ClassifiedResponse::Unknown { code },
    }
}

fn body_code(json: &Value) -> Option<String> {
    match json.get("code")? {
        Value::String(code) => Some(code.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// `error.detail` from a 400 body, when the provider sent one.
fn error_detail(body: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(body).ok()?;
    json.get("error")?.get("detail")?.as_str().map(str::to_owned)
}
