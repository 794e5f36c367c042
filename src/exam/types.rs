//! Exam records and the professor index derived from them.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::Error;

/// One examination: a student and an unordered pair of examiners.
///
/// Field names match the columns of the exam table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exam {
    /// Unique identifier.
    pub exam_id: u32,
    /// Student name.
    pub student: String,
    /// First examiner.
    pub prof_1: String,
    /// Second examiner.
    pub prof_2: String,
}

impl Exam {
    pub fn new(
        exam_id: u32,
        student: impl Into<String>,
        prof_1: impl Into<String>,
        prof_2: impl Into<String>,
    ) -> Self {
        Self {
            exam_id,
            student: student.into(),
            prof_1: prof_1.into(),
            prof_2: prof_2.into(),
        }
    }
}

/// Exams sharing one unordered professor pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairGroup {
    /// Professor ids, ordered by professor name.
    pub professors: [usize; 2],
    /// Exam indices (positions in [`Roster::exams`]), in input order.
    pub exams: Vec<usize>,
}

impl PairGroup {
    pub fn len(&self) -> usize {
        self.exams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exams.is_empty()
    }

    /// Number of unordered exam pairs in the group.
    pub fn pair_count(&self) -> usize {
        let k = self.exams.len();
        k * k.saturating_sub(1) / 2
    }
}

/// Validated exam list with dense professor ids.
///
/// Professors are numbered in order of first appearance (`prof_1` before
/// `prof_2` within a record). Exams are addressed by their position in the
/// input, so per-exam data lives in plain vectors.
#[derive(Debug, Clone)]
pub struct Roster {
    exams: Vec<Exam>,
    professors: Vec<String>,
    exam_professors: Vec<[usize; 2]>,
    professor_exams: Vec<Vec<usize>>,
    pair_groups: Vec<PairGroup>,
    exam_group: Vec<Option<usize>>,
}

impl Roster {
    /// Indexes a list of exams.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateExamId`] when two records share an id, and
    /// [`Error::IdenticalExaminers`] when a record names the same professor
    /// twice.
    pub fn new(exams: Vec<Exam>) -> Result<Self, Error> {
        let mut seen = HashSet::with_capacity(exams.len());
        let mut ids: HashMap<&str, usize> = HashMap::new();
        let mut professors = Vec::new();
        let mut exam_professors = Vec::with_capacity(exams.len());
        let mut professor_exams: Vec<Vec<usize>> = Vec::new();

        for (index, exam) in exams.iter().enumerate() {
            if !seen.insert(exam.exam_id) {
                return Err(Error::DuplicateExamId(exam.exam_id));
            }
            if exam.prof_1 == exam.prof_2 {
                return Err(Error::IdenticalExaminers {
                    exam_id: exam.exam_id,
                    professor: exam.prof_1.clone(),
                });
            }

            let mut pair = [0; 2];
            for (slot, name) in [&exam.prof_1, &exam.prof_2].into_iter().enumerate() {
                let id = *ids.entry(name.as_str()).or_insert_with(|| {
                    professors.push(name.clone());
                    professor_exams.push(Vec::new());
                    professors.len() - 1
                });
                professor_exams[id].push(index);
                pair[slot] = id;
            }
            exam_professors.push(pair);
        }

        let mut by_pair: BTreeMap<(&str, &str), Vec<usize>> = BTreeMap::new();
        for (index, exam) in exams.iter().enumerate() {
            let key = if exam.prof_1 <= exam.prof_2 {
                (exam.prof_1.as_str(), exam.prof_2.as_str())
            } else {
                (exam.prof_2.as_str(), exam.prof_1.as_str())
            };
            by_pair.entry(key).or_default().push(index);
        }

        let mut exam_group = vec![None; exams.len()];
        let mut pair_groups = Vec::new();
        for ((a, b), members) in by_pair {
            if members.len() < 2 {
                continue;
            }
            for &x in &members {
                exam_group[x] = Some(pair_groups.len());
            }
            pair_groups.push(PairGroup {
                professors: [ids[a], ids[b]],
                exams: members,
            });
        }

        Ok(Self {
            exams,
            professors,
            exam_professors,
            professor_exams,
            pair_groups,
            exam_group,
        })
    }

    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    pub fn exam(&self, index: usize) -> &Exam {
        &self.exams[index]
    }

    pub fn len(&self) -> usize {
        self.exams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exams.is_empty()
    }

    pub fn professor_count(&self) -> usize {
        self.professors.len()
    }

    pub fn professor_name(&self, professor: usize) -> &str {
        &self.professors[professor]
    }

    /// Professor ids of an exam, `[prof_1, prof_2]`.
    pub fn exam_professors(&self, exam: usize) -> [usize; 2] {
        self.exam_professors[exam]
    }

    /// Exams a professor examines, in input order.
    pub fn professor_exams(&self, professor: usize) -> &[usize] {
        &self.professor_exams[professor]
    }

    /// Groups of two or more exams sharing a professor pair.
    pub fn pair_groups(&self) -> &[PairGroup] {
        &self.pair_groups
    }

    /// Index of the pair group an exam belongs to.
    pub fn exam_group(&self, exam: usize) -> Option<usize> {
        self.exam_group[exam]
    }

    /// Exams per professor, most loaded first (ties by name).
    pub fn workload(&self) -> Vec<(&str, usize)> {
        let mut load: Vec<(&str, usize)> = self
            .professors
            .iter()
            .zip(&self.professor_exams)
            .map(|(name, exams)| (name.as_str(), exams.len()))
            .collect();
        load.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        load
    }

    /// Whether two exams share an examiner.
    pub fn share_professor(&self, a: usize, b: usize) -> bool {
        let [a1, a2] = self.exam_professors[a];
        let [b1, b2] = self.exam_professors[b];
        a1 == b1 || a1 == b2 || a2 == b1 || a2 == b2
    }
}
