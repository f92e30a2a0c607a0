use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// The value a respondent gave for one question.
///
/// Serialized untagged, so the stored JSON is the plain string or number the
/// caller sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Free text answer
    Text(String),
    /// Numeric answer (rating, scale, count)
    Number(Number),
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        AnswerValue::Number(Number::from(value))
    }
}

/// One entry of a submission's `answers` array.
///
/// Entries are not validated individually. Anything that does not fit the
/// `{ questionId: integer, answer: string | number }` shape is kept verbatim
/// as [`SurveyAnswer::Raw`] so nothing the caller sent is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurveyAnswer {
    Typed {
        #[serde(rename = "questionId")]
        question_id: i64,
        answer: AnswerValue,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Raw(Value),
}

impl SurveyAnswer {
    /// Build a well-formed answer.
    pub fn new(question_id: i64, answer: impl Into<AnswerValue>) -> Self {
        SurveyAnswer::Typed {
            question_id,
            answer: answer.into(),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn question_id(&self) -> Option<i64> {
        match self {
            SurveyAnswer::Typed { question_id, .. } => Some(*question_id),
            SurveyAnswer::Raw(_) => None,
        }
    }

    #[must_use]
    pub fn answer(&self) -> Option<&AnswerValue> {
        match self {
            SurveyAnswer::Typed { answer, .. } => Some(answer),
            SurveyAnswer::Raw(_) => None,
        }
    }
}

/// One completed survey as accepted by the submission endpoint.
///
/// `submission_id` is caller supplied and not checked for uniqueness. It and
/// `timestamp` are normally strings but are kept as whatever truthy JSON value
/// the caller sent. Unknown top-level keys are kept in `extra` and written back
/// to the store alongside the known fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    pub submission_id: Value,
    pub group_id: String,
    pub answers: Vec<SurveyAnswer>,
    pub timestamp: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SurveySubmission {
    pub fn new(
        submission_id: impl Into<Value>,
        group_id: impl Into<String>,
        answers: Vec<SurveyAnswer>,
        timestamp: impl Into<Value>,
    ) -> Self {
        Self {
            submission_id: submission_id.into(),
            group_id: group_id.into(),
            answers,
            timestamp: timestamp.into(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_answer_value_untagged() {
        let text: AnswerValue = serde_json::from_value(json!("yes")).unwrap();
        assert_eq!(text, AnswerValue::Text("yes".to_string()));
        let num: AnswerValue = serde_json::from_value(json!(4)).unwrap();
        assert_eq!(num, AnswerValue::from(4));
        assert_eq!(serde_json::to_value(&num).unwrap(), json!(4));
    }

    #[test]
    fn test_submission_uses_camel_case() {
        let sub = SurveySubmission::new("s-1", "g-1", vec![SurveyAnswer::new(1, "a")], "t");
        let v = serde_json::to_value(&sub).unwrap();
        assert_eq!(
            v,
            json!({
                "submissionId": "s-1",
                "groupId": "g-1",
                "answers": [{ "questionId": 1, "answer": "a" }],
                "timestamp": "t"
            })
        );
    }

    #[test]
    fn test_malformed_answer_kept_raw() {
        let v = json!({
            "submissionId": "s",
            "groupId": "g",
            "answers": [{ "questionId": "one", "answer": true }, 7],
            "timestamp": "t"
        });
        let sub: SurveySubmission = serde_json::from_value(v.clone()).unwrap();
        assert_eq!(
            sub.answers[0],
            SurveyAnswer::Raw(json!({ "questionId": "one", "answer": true }))
        );
        assert_eq!(sub.answers[1], SurveyAnswer::Raw(json!(7)));
        assert_eq!(serde_json::to_value(&sub).unwrap(), v);
    }

    #[test]
    fn test_extra_fields_survive() {
        let v = json!({
            "submissionId": "s",
            "groupId": "g",
            "answers": [{ "questionId": 2, "answer": 5, "comment": "fine" }],
            "timestamp": "t",
            "locale": "ja-JP"
        });
        let sub: SurveySubmission = serde_json::from_value(v.clone()).unwrap();
        assert_eq!(sub.extra.get("locale"), Some(&json!("ja-JP")));
        assert_eq!(sub.answers[0].question_id(), Some(2));
        assert_eq!(serde_json::to_value(&sub).unwrap(), v);
    }
}
