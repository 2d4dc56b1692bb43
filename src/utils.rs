/// Find the positions of the new line characters in the file contents.
pub fn find_new_lines(contents: &str) -> Vec<usize> {
    contents
        .match_indices('\n')
        .map(|x| x.0)
        .collect::<Vec<usize>>()
}

/// Takes the byte offset of an AST node and the indices of the new lines.
/// Returns the 1-based row of the node in the file.
///
/// The row is 1 + the number of new line characters before the offset.
/// "x = 1\nMy_Var = 2"
/// -> there is one \n before the start of `My_Var` so it is on line 2.
pub fn find_row(start: usize, loc_new_lines: &[usize]) -> usize {
    let n_new_lines = loc_new_lines.iter().filter(|x| **x < start).count();
    n_new_lines + 1
}
