//! Query context table
//!
//! A query block may hold several contexts (queries or strands) laid end to
//! end. Word hits carry an offset into that block; the context it falls in
//! decides which cutoffs apply to the hit.

/// One context of the concatenated query block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextInfo {
    /// Offset of this context within the query block
    pub query_offset: i32,
    /// Length of this context
    pub query_length: i32,
    /// Index of the query this context belongs to
    pub query_index: i32,
    /// 0 = plus strand, 1 = minus strand
    pub frame: i8,
}

impl ContextInfo {
    /// One past the last offset of this context
    #[inline]
    pub fn end_offset(&self) -> i32 {
        self.query_offset + self.query_length
    }

    /// Offsets of the query block covered by this context
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.query_offset as usize..self.end_offset() as usize
    }
}

/// Ordered (start, end) ranges of every context in a query block
#[derive(Clone, Debug)]
pub struct QueryInfo {
    pub contexts: Vec<ContextInfo>,
    /// Length of the longest context
    pub max_length: u32,
    /// Length of the shortest context
    pub min_length: u32,
}

impl QueryInfo {
    /// Build the context table for contexts of the given lengths, placed
    /// back to back starting at offset 0.
    pub fn from_lengths(lengths: &[usize]) -> Self {
        let mut contexts = Vec::with_capacity(lengths.len());
        let mut query_offset = 0i32;
        for (idx, &len) in lengths.iter().enumerate() {
            contexts.push(ContextInfo {
                query_offset,
                query_length: len as i32,
                query_index: idx as i32,
                frame: 0,
            });
            query_offset += len as i32;
        }
        Self::with_contexts(contexts)
    }

    /// A single context covering a whole query of `length` bases
    pub fn single(length: usize) -> Self {
        Self::from_lengths(&[length])
    }

    pub fn with_contexts(contexts: Vec<ContextInfo>) -> Self {
        let max_length = contexts
            .iter()
            .map(|c| c.query_length as u32)
            .max()
            .unwrap_or(0);
        let min_length = contexts
            .iter()
            .map(|c| c.query_length as u32)
            .min()
            .unwrap_or(0);
        Self {
            contexts,
            max_length,
            min_length,
        }
    }

    #[inline]
    pub fn num_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// Total length of the query block
    pub fn total_length(&self) -> usize {
        self.contexts
            .last()
            .map(|c| c.end_offset() as usize)
            .unwrap_or(0)
    }

    /// Context owning query offset `q_off`
    #[inline]
    pub fn context_for_offset(&self, q_off: usize) -> usize {
        bsearch_context_info(q_off as i32, self)
    }
}

/// Binary search for the context containing offset `n`.
///
/// When all contexts start at a multiple of their lengths the search window
/// is first narrowed using the shortest and longest context lengths.
pub fn bsearch_context_info(n: i32, query_info: &QueryInfo) -> usize {
    let size = query_info.contexts.len();
    if size <= 1 {
        return 0;
    }

    let (mut b, mut e) = if query_info.min_length > 0 && query_info.max_length > 0 {
        let b_val = (n / query_info.max_length as i32).min(size as i32 - 1);
        let e_val = (n / query_info.min_length as i32 + 1).min(size as i32);
        (b_val.max(0) as usize, e_val.max(0) as usize)
    } else {
        (0, size)
    };

    while b < e.saturating_sub(1) {
        let m = (b + e) / 2;
        if query_info.contexts[m].query_offset > n {
            e = m;
        } else {
            b = m;
        }
    }

    b
}
