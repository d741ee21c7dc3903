/*!

This is the long-form manual for `social_choice` and `votesim`.

## Profiles

A profile is a list of ballots. Every ballot is a strict ranking of the same
set of candidates, most preferred first. Partial ballots, ties inside a
ballot and write-ins are not supported: `Profile::new` rejects them.

The candidates of a profile are kept in sorted order. This order is used for
the rows and columns of the pairwise matrix, and for breaking ties.

## Rules

| rule        | score                                  | best    |
|-------------|----------------------------------------|---------|
| `plurality` | number of first places                 | highest |
| `veto`      | number of last places                  | lowest  |
| `borda`     | sum of the 0-based positions           | lowest  |
| `copeland`  | pairwise wins minus pairwise losses    | highest |
| `irv`       | reverse order of elimination           | -       |

### Ties

Candidates with equal scores are ordered by name: `"a"` comes before `"b"`.
In particular:
- plurality, veto, Borda and Copeland orderings list tied candidates in
  alphabetical order;
- instant-runoff eliminates, among the candidates with the fewest first
  places, the one with the largest name;
- a Copeland pairwise contest that ends in a tie gives no point to either
  candidate.

### Instant-runoff rounds

The scores of `irv` are the plurality tallies of every round. With `m`
candidates there are exactly `m - 1` rounds.

## Properties

`unanimity` checks that whenever every voter ranks `x` above `y`, the rule
also ranks `x` above `y`.

`strategyproof` tries, for every voter who does not rank the winner first,
every possible ballot. It reports the first misreport that elects a
candidate the voter strictly prefers to the sincere winner. The search costs
`n * m!` rule evaluations, so the caller passes a limit on the number of
candidates (7 is practical).

## Input formats for `votesim`

### `csv`

One ballot per row, most preferred candidate first:

```text
a,b,c,d
b,c,d,a
```

Use `firstVoteRowIndex` (1-based) to skip a header row and
`firstVoteColumnIndex` (1-based) to skip leading id columns.

### `ratings_csv` and `ratings_xlsx`

One row per voter, one column per candidate, numeric ratings. Candidates are
named `00`, `01`, ... after their column. Each voter ranks the candidates by
decreasing rating. For Excel inputs the worksheet is chosen with
`worksheetName` (default: the first sheet).

### `random`

No input file. `voters` ballots over `candidates` candidates, drawn with the
given `seed`.

## Configuration

`votesim --config analysis.json` reads a JSON file:

```json
{
  "outputSettings": { "analysisName": "sample" },
  "profileSource": { "provider": "csv", "filePath": "ballots.csv" },
  "rules": ["plurality", "borda", "irv"],
  "checks": { "unanimity": true, "strategyproof": true, "maxCandidates": 6 },
  "subProfile": { "candidates": ["a", "b", "c"] }
}
```

Paths are relative to the configuration file. Command line flags take
precedence over the configuration.

 */
